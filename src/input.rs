//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Select,
    Cancel,
    NewBoard,
    Quit,
    None,
}

/// Map key event to an action. Supports both arrows and hjkl.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return match code {
            KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
            _ => Action::None,
        };
    }
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Backspace | KeyCode::Char('x') => Action::Cancel,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::NewBoard,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_vim_and_arrows_agree() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Char('h'), none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Left, none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Char('k'), none)), Action::Up);
        assert_eq!(key_to_action(key(KeyCode::Up, none)), Action::Up);
    }

    #[test]
    fn test_quit_and_new_board_ignore_shift() {
        let shift = KeyModifiers::SHIFT;
        assert_eq!(key_to_action(key(KeyCode::Char('Q'), shift)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('q'), KeyModifiers::NONE)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('R'), shift)), Action::NewBoard);
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('h'), KeyModifiers::ALT)),
            Action::None
        );
    }
}
