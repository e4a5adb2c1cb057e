//! App: terminal init, main loop, selection and animation clock.

use crate::PresenterConfig;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use droptui::{CascadeListener, CascadeState, Color, Coord, Engine, SwapError};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Render frame budget (~60 FPS).
const FRAME: Duration = Duration::from_millis(16);

/// A matched drop still on screen while it fades out.
#[derive(Debug, Clone, Copy)]
pub struct Ghost {
    pub coord: Coord,
    pub color: Color,
}

/// A drop on its way down. The engine already holds it at `target`.
#[derive(Debug, Clone, Copy)]
pub struct FallAnim {
    pub target: Coord,
    pub from_row: usize,
    pub start: Instant,
    pub duration: Duration,
}

impl FallAnim {
    /// Row position (fractional) at `now`.
    pub fn row_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        // ease-in, like something dropping
        let t = t * t;
        let from = self.from_row as f32;
        from - (from - self.target.row as f32) * t
    }

    pub fn landed(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

/// Presenter side of the engine: turns notifications into animations.
#[derive(Debug)]
pub struct Animations {
    pub ghosts: Vec<Ghost>,
    pub falls: Vec<FallAnim>,
    /// Bumped for each removal batch so the fade effect restarts.
    pub generation: u64,
    batch_open: bool,
    clock: Instant,
    fade: Duration,
    fall_per_row: Duration,
}

impl Animations {
    pub(crate) fn new(config: &PresenterConfig) -> Self {
        Self {
            ghosts: Vec::new(),
            falls: Vec::new(),
            generation: 0,
            batch_open: false,
            clock: Instant::now(),
            fade: Duration::from_millis(u64::from(config.fade_ms)),
            fall_per_row: Duration::from_millis(config.fall_ms_per_row),
        }
    }

    fn clear(&mut self) {
        self.ghosts.clear();
        self.falls.clear();
        self.batch_open = false;
    }

    /// Falls whose animation reached the target row.
    fn take_landed(&mut self, now: Instant) -> Vec<Coord> {
        let landed = self
            .falls
            .iter()
            .filter(|f| f.landed(now))
            .map(|f| f.target)
            .collect();
        self.falls.retain(|f| !f.landed(now));
        landed
    }
}

impl CascadeListener for Animations {
    fn on_piece_removed(&mut self, coord: Coord, color: Color) {
        if !self.batch_open {
            self.batch_open = true;
            self.ghosts.clear();
            self.generation = self.generation.wrapping_add(1);
        }
        self.ghosts.push(Ghost { coord, color });
    }

    fn on_piece_falling(&mut self, coord: Coord, from_row: usize, to_row: usize) {
        self.batch_open = false;
        let rows = u32::try_from(from_row - to_row).unwrap_or(u32::MAX);
        self.falls.push(FallAnim {
            target: coord,
            from_row,
            // drops start once the matched ones have faded
            start: self.clock + self.fade,
            duration: self.fall_per_row * rows,
        });
    }

    fn on_cascade_idle(&mut self) {
        self.batch_open = false;
    }
}

pub struct App {
    engine: Engine,
    config: PresenterConfig,
    theme: Theme,
    anim: Animations,
    cursor: Coord,
    selected: Option<Coord>,
    status: String,
    /// TachyonFX fade effect for removed drops (created when a batch appears).
    removal_effect: Option<Effect>,
    /// Last time we processed the removal effect (for delta).
    removal_effect_process_time: Option<Instant>,
    removal_effect_generation: u64,
}

impl App {
    pub fn new(engine: Engine, config: PresenterConfig, theme: Theme) -> Self {
        let size = engine.board().size();
        let anim = Animations::new(&config);
        Self {
            engine,
            config,
            theme,
            anim,
            cursor: Coord::new(size / 2, size / 2),
            selected: None,
            status: String::from("Select a drop"),
            removal_effect: None,
            removal_effect_process_time: None,
            removal_effect_generation: 0,
        }
    }

    fn new_board(&mut self) {
        if let Err(err) = self.engine.reset() {
            self.status = err.to_string();
            return;
        }
        self.anim.clear();
        self.selected = None;
        self.removal_effect = None;
        self.removal_effect_process_time = None;
        self.status = String::from("New board");
    }

    fn move_cursor(&mut self, action: Action) {
        let max = self.engine.board().size().saturating_sub(1);
        let Coord { column, row } = self.cursor;
        self.cursor = match action {
            Action::Left => Coord::new(column.saturating_sub(1), row),
            Action::Right => Coord::new((column + 1).min(max), row),
            Action::Up => Coord::new(column, (row + 1).min(max)),
            Action::Down => Coord::new(column, row.saturating_sub(1)),
            _ => self.cursor,
        };
    }

    /// Click-to-select: a second, adjacent pick swaps; a distant pick moves
    /// the selection; picking the selection again does nothing.
    fn pick(&mut self, coord: Coord) {
        if self.engine.board().color_at(coord).is_none() {
            self.status = String::from("Nothing there");
            return;
        }
        match self.selected {
            None => self.selected = Some(coord),
            Some(sel) if sel == coord => {}
            Some(sel) if sel.is_adjacent(coord) => {
                self.selected = None;
                self.swap(sel, coord);
            }
            Some(_) => self.selected = Some(coord),
        }
    }

    fn swap(&mut self, a: Coord, b: Coord) {
        self.anim.clock = Instant::now();
        match self.engine.request_swap(a, b, &mut self.anim) {
            Ok(true) => {
                self.status = String::from("Match!");
                if self.config.no_animation {
                    self.engine.land_all_falls(&mut self.anim);
                    self.anim.clear();
                }
            }
            Ok(false) => {}
            Err(SwapError::Rejected { .. }) => self.status = String::from("No match, swapped back"),
            Err(SwapError::Busy) => self.status = String::from("Wait for the drops to settle"),
            Err(err) => self.status = err.to_string(),
        }
    }

    /// Acknowledge every fall that finished animating.
    fn tick_falls(&mut self, now: Instant) {
        if self.engine.state() != CascadeState::Settling {
            return;
        }
        self.anim.clock = now;
        for coord in self.anim.take_landed(now) {
            if let Err(err) = self.engine.on_fall_landed(coord, &mut self.anim) {
                log::warn!("landing at {coord} not accepted: {err}");
            }
        }
        if self.engine.is_idle() && self.status == "Match!" {
            let passes = self.engine.passes();
            self.status = if passes > 1 {
                format!("Cascade x{passes}")
            } else {
                String::from("Select a drop")
            };
        }
    }

    fn board_rect(&self) -> Rect {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        crate::ui::board_rect(Rect::new(0, 0, cols, rows), self.engine.board().size())
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            if self.anim.generation != self.removal_effect_generation {
                self.removal_effect = None;
                self.removal_effect_process_time = None;
                self.removal_effect_generation = self.anim.generation;
            }
            terminal.draw(|f| {
                let area = f.area();
                let view = crate::ui::BoardView {
                    engine: &self.engine,
                    anim: &self.anim,
                    theme: &self.theme,
                    cursor: self.cursor,
                    selected: self.selected,
                    status: &self.status,
                    no_animation: self.config.no_animation,
                    fade_ms: self.config.fade_ms,
                };
                crate::ui::draw(
                    f,
                    &view,
                    area,
                    &mut self.removal_effect,
                    &mut self.removal_effect_process_time,
                    now,
                );
            })?;

            if self.removal_effect.as_ref().is_some_and(|e| e.done()) {
                self.anim.ghosts.clear();
                self.removal_effect = None;
                self.removal_effect_process_time = None;
            }

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) => {
                            if key.kind != KeyEventKind::Press {
                                continue;
                            }
                            match key_to_action(key) {
                                Action::Quit => return Ok(()),
                                Action::NewBoard => self.new_board(),
                                Action::Select => self.pick(self.cursor),
                                Action::Cancel => self.selected = None,
                                action @ (Action::Left
                                | Action::Right
                                | Action::Up
                                | Action::Down) => self.move_cursor(action),
                                Action::None => {}
                            }
                        }
                        Event::Mouse(mouse) => {
                            if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                                let rect = self.board_rect();
                                let size = self.engine.board().size();
                                if let Some(coord) =
                                    crate::ui::cell_at(rect, size, mouse.column, mouse.row)
                                {
                                    self.cursor = coord;
                                    self.pick(coord);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }

            self.tick_falls(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droptui::{Board, EngineConfig};

    fn config() -> PresenterConfig {
        PresenterConfig {
            no_animation: false,
            fade_ms: 100,
            fall_ms_per_row: 50,
        }
    }

    #[test]
    fn test_fall_anim_reaches_target() {
        let start = Instant::now();
        let fall = FallAnim {
            target: Coord::new(0, 1),
            from_row: 4,
            start,
            duration: Duration::from_millis(150),
        };
        assert_eq!(fall.row_at(start), 4.0);
        assert_eq!(fall.row_at(start + Duration::from_millis(500)), 1.0);
        assert!(!fall.landed(start + Duration::from_millis(10)));
        assert!(fall.landed(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_animations_wait_for_fade_then_land() {
        let board = Board::from_rows(&["gbg", "ybr", "rrb"]).unwrap();
        let mut engine = Engine::with_board(EngineConfig::default(), board).unwrap();
        let mut anim = Animations::new(&config());
        let t0 = anim.clock;
        engine
            .request_swap(Coord::new(2, 0), Coord::new(2, 1), &mut anim)
            .unwrap();
        assert_eq!(anim.ghosts.len(), 3);
        assert_eq!(anim.generation, 1);
        assert_eq!(anim.falls.len(), 6);

        // still fading
        assert!(anim.take_landed(t0 + Duration::from_millis(90)).is_empty());
        // every fall here is one row: fade 100 + 50
        let landed = anim.take_landed(t0 + Duration::from_millis(150));
        assert_eq!(landed.len(), 6);
        for coord in landed {
            engine.on_fall_landed(coord, &mut anim).unwrap();
        }
        assert!(engine.is_idle());
    }

    #[test]
    fn test_pick_selects_then_swaps_neighbour() {
        let board = Board::from_rows(&["gbg", "ybr", "rrb"]).unwrap();
        let engine = Engine::with_board(EngineConfig::default(), board).unwrap();
        let mut app = App::new(engine, config(), Theme::default());

        app.pick(Coord::new(0, 2));
        assert_eq!(app.selected, Some(Coord::new(0, 2)));
        // not adjacent: selection moves
        app.pick(Coord::new(2, 0));
        assert_eq!(app.selected, Some(Coord::new(2, 0)));
        app.pick(Coord::new(2, 0));
        assert_eq!(app.selected, Some(Coord::new(2, 0)));
        app.pick(Coord::new(2, 1));
        assert_eq!(app.selected, None);
        assert_eq!(app.engine.state(), CascadeState::Settling);
        assert_eq!(app.status, "Match!");
    }

    #[test]
    fn test_no_animation_settles_immediately() {
        let board = Board::from_rows(&["gbg", "ybr", "rrb"]).unwrap();
        let engine = Engine::with_board(EngineConfig::default(), board).unwrap();
        let mut cfg = config();
        cfg.no_animation = true;
        let mut app = App::new(engine, cfg, Theme::default());
        app.swap(Coord::new(2, 0), Coord::new(2, 1));
        assert!(app.engine.is_idle());
        assert!(app.anim.falls.is_empty());
    }
}
