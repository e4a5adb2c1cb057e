//! Layout and drawing: board, falling drops, markers, sidebar.

use crate::app::Animations;
use crate::theme::Theme;
use droptui::{CascadeState, Coord, Engine};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal cells per board cell.
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;

/// Drop glyph, one string per terminal row.
const DROP: [&str; 2] = ["▄██▄", "▀██▀"];

/// Everything the renderer reads in one frame.
pub struct BoardView<'a> {
    pub engine: &'a Engine,
    pub anim: &'a Animations,
    pub theme: &'a Theme,
    pub cursor: Coord,
    pub selected: Option<Coord>,
    pub status: &'a str,
    pub no_animation: bool,
    pub fade_ms: u32,
}

/// Board with its border, sized for `size` cells per side.
fn board_outer_size(size: usize) -> (u16, u16) {
    let n = u16::try_from(size).unwrap_or(u16::MAX);
    (
        n.saturating_mul(CELL_WIDTH).saturating_add(2),
        n.saturating_mul(CELL_HEIGHT).saturating_add(2),
    )
}

/// Centered board + sidebar, split in two.
fn layout(area: Rect, size: usize) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(size);
    let total_w = bw.saturating_add(SIDEBAR_WIDTH);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

/// Board rect without the border; matches what [`draw`] paints.
pub fn board_rect(area: Rect, size: usize) -> Rect {
    let (outer, _) = layout(area, size);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Board cell under a terminal position. Row 0 is the bottom line of cells.
pub fn cell_at(rect: Rect, size: usize, x: u16, y: u16) -> Option<Coord> {
    if !rect.contains(Position { x, y }) {
        return None;
    }
    let column = usize::from((x - rect.x) / CELL_WIDTH);
    let line = usize::from((y - rect.y) / CELL_HEIGHT);
    if column >= size || line >= size {
        return None;
    }
    Some(Coord::new(column, size - 1 - line))
}

/// Top-left terminal position of a (possibly fractional) board row.
fn cell_origin(rect: Rect, size: usize, column: usize, row: f32) -> (i32, i32) {
    let line = (size as f32 - 1.0 - row) * f32::from(CELL_HEIGHT);
    (
        i32::from(rect.x) + (column as i32) * i32::from(CELL_WIDTH),
        i32::from(rect.y) + line.round() as i32,
    )
}

/// Write `text` at (x, y), dropping whatever falls outside `clip`.
fn put(buf: &mut Buffer, clip: Rect, x: i32, y: i32, text: &str, style: Style) {
    for (i, ch) in text.chars().enumerate() {
        let cx = x + i as i32;
        let (Ok(cx), Ok(cy)) = (u16::try_from(cx), u16::try_from(y)) else {
            continue;
        };
        if clip.contains(Position { x: cx, y: cy }) {
            buf[(cx, cy)].set_char(ch).set_style(style);
        }
    }
}

fn paint_drop(buf: &mut Buffer, clip: Rect, origin: (i32, i32), color: Color, bg: Color) {
    let style = Style::default().fg(color).bg(bg);
    for (dy, line) in DROP.iter().enumerate() {
        put(buf, clip, origin.0, origin.1 + dy as i32, line, style);
    }
}

/// Brackets on both sides of a cell.
fn paint_marker(
    buf: &mut Buffer,
    clip: Rect,
    origin: (i32, i32),
    glyphs: (&str, &str),
    fg: Color,
    bg: Color,
) {
    let style = Style::default().fg(fg).bg(bg);
    let right = origin.0 + i32::from(CELL_WIDTH) - 1;
    for dy in 0..i32::from(CELL_HEIGHT) {
        put(buf, clip, origin.0, origin.1 + dy, glyphs.0, style);
        put(buf, clip, right, origin.1 + dy, glyphs.1, style);
    }
}

/// Buffer positions covered by the fading drops.
fn ghost_positions(rect: Rect, size: usize, view: &BoardView) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for ghost in &view.anim.ghosts {
        let (x0, y0) = cell_origin(rect, size, ghost.coord.column, ghost.coord.row as f32);
        for dy in 0..i32::from(CELL_HEIGHT) {
            for dx in 0..i32::from(CELL_WIDTH) {
                if let (Ok(x), Ok(y)) = (u16::try_from(x0 + dx), u16::try_from(y0 + dy)) {
                    if rect.contains(Position { x, y }) {
                        set.insert((x, y));
                    }
                }
            }
        }
    }
    set
}

/// Create or advance the fade for removed drops (TachyonFX: fade to bg).
fn apply_removal_effect(
    frame: &mut Frame,
    view: &BoardView,
    rect: Rect,
    removal_effect: &mut Option<Effect>,
    removal_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = removal_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *removal_process_time = Some(now);

    if removal_effect.is_none() {
        let size = view.engine.board().size();
        let fading = ghost_positions(rect, size, view);
        let filter =
            CellFilter::PositionFn(ref_count(move |pos: Position| fading.contains(&(pos.x, pos.y))));
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (view.fade_ms, Interpolation::Linear))
            .with_filter(filter)
            .with_area(rect);
        *removal_effect = Some(effect);
    }

    if let Some(effect) = removal_effect {
        frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
    }
}

/// Draw the board and sidebar. While drops are fading (and animations are on)
/// the TachyonFX effect in `removal_effect` is created or advanced.
pub fn draw(
    frame: &mut Frame,
    view: &BoardView,
    area: Rect,
    removal_effect: &mut Option<Effect>,
    removal_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let size = view.engine.board().size();
    let (board_area, sidebar_area) = layout(area, size);
    draw_board(frame, view, board_area, now);
    draw_sidebar(frame, view, sidebar_area);

    if !view.no_animation && !view.anim.ghosts.is_empty() {
        let rect = board_rect(area, size);
        apply_removal_effect(frame, view, rect, removal_effect, removal_process_time, now);
    }
}

fn draw_board(frame: &mut Frame, view: &BoardView, area: Rect, now: Instant) {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" droptui ", theme.title));
    let rect = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = view.engine.board();
    let size = board.size();
    let buf = frame.buffer_mut();

    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            buf[(x, y)].set_char(' ').set_style(Style::default().bg(theme.bg));
        }
    }

    if !view.no_animation {
        for ghost in &view.anim.ghosts {
            let origin = cell_origin(rect, size, ghost.coord.column, ghost.coord.row as f32);
            paint_drop(buf, rect, origin, theme.piece_color(ghost.color), theme.bg);
        }
    }

    // falling drops are drawn at their animated row instead of their target
    let falling: BTreeSet<Coord> = view.anim.falls.iter().map(|f| f.target).collect();
    for coord in board.coords() {
        if falling.contains(&coord) {
            continue;
        }
        if let Some(color) = board.color_at(coord) {
            let origin = cell_origin(rect, size, coord.column, coord.row as f32);
            paint_drop(buf, rect, origin, theme.piece_color(color), theme.bg);
        }
    }
    for fall in &view.anim.falls {
        if let Some(color) = board.color_at(fall.target) {
            let origin = cell_origin(rect, size, fall.target.column, fall.row_at(now));
            paint_drop(buf, rect, origin, theme.piece_color(color), theme.bg);
        }
    }

    if let Some(sel) = view.selected {
        let origin = cell_origin(rect, size, sel.column, sel.row as f32);
        paint_marker(buf, rect, origin, ("▶", "◀"), theme.title, theme.bg);
    }
    if view.selected != Some(view.cursor) {
        let origin = cell_origin(rect, size, view.cursor.column, view.cursor.row as f32);
        paint_marker(buf, rect, origin, ("[", "]"), theme.main_fg, theme.bg);
    }
}

fn state_label(state: CascadeState) -> &'static str {
    match state {
        CascadeState::Idle => "Ready",
        CascadeState::Resolving => "Clearing",
        CascadeState::Settling => "Falling",
        CascadeState::Rechecking => "Checking",
    }
}

fn draw_sidebar(frame: &mut Frame, view: &BoardView, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let engine = view.engine;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // stats
            Constraint::Length(3), // palette
            Constraint::Fill(1),   // status + keys
        ])
        .split(area);

    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let selected = view
        .selected
        .map_or_else(|| String::from("-"), |c| c.to_string());
    let stats = vec![
        stat("State: ", state_label(engine.state()).to_string()),
        stat("Drops: ", engine.board().occupied_count().to_string()),
        stat("Falling: ", engine.falls_in_flight().to_string()),
        stat("Passes: ", engine.passes().to_string()),
        stat("Selected: ", selected),
    ];
    Paragraph::new(stats)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[0], frame.buffer_mut());

    let mut swatches = Vec::new();
    for color in &engine.config().palette {
        let c = theme.piece_color(*color);
        swatches.push(Span::styled("██", Style::default().fg(c).bg(theme.bg)));
        swatches.push(Span::raw(" "));
    }
    Paragraph::new(Line::from(swatches))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[1], frame.buffer_mut());

    let lines = vec![
        Line::from(Span::styled(view.status.to_string(), title_style)),
        Line::from(""),
        Line::from(Span::styled("←↓↑→ hjkl  move", dim_style)),
        Line::from(Span::styled("Enter/click pick", dim_style)),
        Line::from(Span::styled("x  drop selection", dim_style)),
        Line::from(Span::styled("R  new board", dim_style)),
        Line::from(Span::styled("Q  quit", dim_style)),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[2], frame.buffer_mut());
}
