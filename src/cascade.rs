//! Cascade controller: owns the board and drives
//! remove → fall → settle → re-check until no match is left.

use crate::assign::assign_colors;
use crate::board::{Board, Color, Coord};
use crate::config::EngineConfig;
use crate::error::{ConfigError, FallError, SwapError};
use crate::gravity::{Fall, compact_all, is_settled};
use crate::matcher::{MatchSet, find_matches};
use crate::swap::{SwapVerdict, attempt_swap};
use log::{debug, info, trace};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::BTreeSet;

/// Controller state. Swaps are accepted only in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    Idle,
    Resolving,
    Settling,
    Rechecking,
}

/// Outbound notifications to the presenter. All methods default to no-ops.
pub trait CascadeListener {
    /// A matched piece of `color` was cleared from `coord`.
    fn on_piece_removed(&mut self, _coord: Coord, _color: Color) {}

    /// A piece is dropping in `coord.column` and will land at `coord`.
    /// The engine waits for [`Engine::on_fall_landed`] with the same `coord`.
    fn on_piece_falling(&mut self, _coord: Coord, _from_row: usize, _to_row: usize) {}

    /// The board is stable and accepts swaps again.
    fn on_cascade_idle(&mut self) {}
}

/// Listener that ignores everything.
impl CascadeListener for () {}

/// Notification as a value, for presenters that queue them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PieceRemoved { coord: Coord, color: Color },
    PieceFalling { coord: Coord, from_row: usize, to_row: usize },
    CascadeIdle,
}

/// Records events in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }

    pub fn removed(&self) -> impl Iterator<Item = Coord> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::PieceRemoved { coord, .. } => Some(*coord),
            _ => None,
        })
    }

    pub fn falling(&self) -> impl Iterator<Item = Coord> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::PieceFalling { coord, .. } => Some(*coord),
            _ => None,
        })
    }
}

impl CascadeListener for EventLog {
    fn on_piece_removed(&mut self, coord: Coord, color: Color) {
        self.events.push(Event::PieceRemoved { coord, color });
    }

    fn on_piece_falling(&mut self, coord: Coord, from_row: usize, to_row: usize) {
        self.events.push(Event::PieceFalling {
            coord,
            from_row,
            to_row,
        });
    }

    fn on_cascade_idle(&mut self) {
        self.events.push(Event::CascadeIdle);
    }
}

/// Single owner of the board. Every structural mutation goes through here.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    board: Board,
    rng: SmallRng,
    state: CascadeState,
    /// Landing cells of falls not yet acknowledged.
    in_flight: BTreeSet<Coord>,
    /// Remove → fall passes run by the current (or last) cascade.
    passes: usize,
}

impl Engine {
    /// Validate `config` and deal a match-free board.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let mut engine = Self {
            board: Board::new(config.size),
            config,
            rng,
            state: CascadeState::Idle,
            in_flight: BTreeSet::new(),
            passes: 0,
        };
        engine.deal()?;
        Ok(engine)
    }

    /// Start over on a given board, e.g. a hand-built position.
    ///
    /// The board's size replaces the configured one. The board must hold only
    /// palette colours, have no match and no piece above an empty cell.
    pub fn with_board(config: EngineConfig, board: Board) -> Result<Self, ConfigError> {
        let config = EngineConfig {
            size: board.size(),
            ..config
        };
        config.validate()?;
        if let Some(color) = board
            .coords()
            .filter_map(|coord| board.color_at(coord))
            .find(|color| !config.palette.contains(color))
        {
            return Err(ConfigError::ColorNotInPalette(color));
        }
        if !find_matches(&board).is_empty() || !is_settled(&board) {
            return Err(ConfigError::BoardNotStable);
        }
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            config,
            board,
            rng,
            state: CascadeState::Idle,
            in_flight: BTreeSet::new(),
            passes: 0,
        })
    }

    /// Throw the board away and deal a fresh one. Pending falls are dropped.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.board = Board::new(self.config.size);
        self.in_flight.clear();
        self.state = CascadeState::Idle;
        self.passes = 0;
        self.deal()
    }

    fn deal(&mut self) -> Result<(), ConfigError> {
        assign_colors(&mut self.board, &self.config.palette, &mut self.rng)?;
        info!(
            "dealt {size}x{size} board with {} colours",
            self.config.palette.len(),
            size = self.config.size
        );
        trace!("board:\n{}", self.board);
        Ok(())
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> CascadeState {
        self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == CascadeState::Idle
    }

    /// Number of falls awaiting acknowledgement.
    #[inline]
    pub fn falls_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Landing cells of the falls awaiting acknowledgement.
    pub fn pending_falls(&self) -> impl Iterator<Item = Coord> + '_ {
        self.in_flight.iter().copied()
    }

    #[inline]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Player swap. On success the first removal and fall pass has already
    /// been reported to `listener`; the cascade continues as falls land.
    ///
    /// Returns `Ok(false)` for a benign self-swap.
    pub fn request_swap<L: CascadeListener + ?Sized>(
        &mut self,
        a: Coord,
        b: Coord,
        listener: &mut L,
    ) -> Result<bool, SwapError> {
        if !self.is_idle() {
            debug!("swap {a} <-> {b} ignored: cascade in {:?}", self.state);
            return Err(SwapError::Busy);
        }
        match attempt_swap(&mut self.board, a, b) {
            Ok(SwapVerdict::Ignored) => Ok(false),
            Ok(SwapVerdict::Accepted(matched)) => {
                debug!("swap {a} <-> {b} accepted, {} cells matched", matched.len());
                self.passes = 0;
                self.resolve(matched, listener);
                Ok(true)
            }
            Err(err) => {
                debug!("swap {a} <-> {b} refused: {err}");
                Err(err)
            }
        }
    }

    /// Presenter acknowledgement that the fall landing at `coord` settled.
    /// The last acknowledgement of a pass triggers the re-check.
    pub fn on_fall_landed<L: CascadeListener + ?Sized>(
        &mut self,
        coord: Coord,
        listener: &mut L,
    ) -> Result<(), FallError> {
        if self.state != CascadeState::Settling {
            return Err(FallError::NotSettling);
        }
        if !self.in_flight.remove(&coord) {
            return Err(FallError::FallNotPending(coord));
        }
        trace!("fall landed at {coord}, {} still in flight", self.in_flight.len());
        if self.in_flight.is_empty() {
            self.recheck(listener);
        }
        Ok(())
    }

    /// Acknowledge every pending fall, running the cascade to completion
    /// when the presenter does not animate.
    pub fn land_all_falls<L: CascadeListener + ?Sized>(&mut self, listener: &mut L) {
        while self.state == CascadeState::Settling {
            let Some(&coord) = self.in_flight.first() else {
                break;
            };
            // the coordinate comes from the pending set, so this cannot fail
            let _ = self.on_fall_landed(coord, listener);
        }
    }

    fn resolve<L: CascadeListener + ?Sized>(&mut self, matched: MatchSet, listener: &mut L) {
        self.state = CascadeState::Resolving;
        self.passes += 1;
        debug!("cascade pass {}: removing {} cells", self.passes, matched.len());
        for coord in matched {
            if let Some(color) = self.board.color_at(coord) {
                self.board.put(coord, None);
                listener.on_piece_removed(coord, color);
            }
        }

        self.state = CascadeState::Settling;
        let falls = compact_all(&mut self.board);
        for Fall {
            column,
            from_row,
            to_row,
            ..
        } in falls
        {
            let target = Coord::new(column, to_row);
            trace!("piece falls in column {column}: {from_row} -> {to_row}");
            self.in_flight.insert(target);
            listener.on_piece_falling(target, from_row, to_row);
        }
        if self.in_flight.is_empty() {
            self.recheck(listener);
        }
    }

    fn recheck<L: CascadeListener + ?Sized>(&mut self, listener: &mut L) {
        self.state = CascadeState::Rechecking;
        let matched = find_matches(&self.board);
        if matched.is_empty() {
            self.state = CascadeState::Idle;
            debug!("cascade settled after {} passes", self.passes);
            trace!("board:\n{}", self.board);
            listener.on_cascade_idle();
        } else {
            self.resolve(matched, listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(rows: &[&str]) -> Engine {
        let board = Board::from_rows(rows).unwrap();
        Engine::with_board(EngineConfig::default().with_seed(1), board).unwrap()
    }

    #[test]
    fn test_new_board_is_full_and_match_free() {
        let engine = Engine::new(EngineConfig::default().with_seed(3)).unwrap();
        assert_eq!(engine.board().occupied_count(), 64);
        assert!(find_matches(engine.board()).is_empty());
        assert!(engine.is_idle());
    }

    #[test]
    fn test_bad_config_fails_at_setup() {
        let config = EngineConfig {
            palette: vec![Color::Red, Color::Green],
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(ConfigError::PaletteTooSmall { .. })
        ));
    }

    #[test]
    fn test_unstable_board_fails_at_setup() {
        // rrr on the ground and an unsupported row on top
        let board = Board::from_rows(&["rgb", "...", "rrr"]).unwrap();
        assert_eq!(
            Engine::with_board(EngineConfig::default(), board).unwrap_err(),
            ConfigError::BoardNotStable
        );

        // no match, but a gap under the top row
        let board = Board::from_rows(&["rgb", "...", "gby"]).unwrap();
        assert_eq!(
            Engine::with_board(EngineConfig::default(), board).unwrap_err(),
            ConfigError::BoardNotStable
        );

        let board = Board::from_rows(&["...", "...", "rmg"]).unwrap();
        assert_eq!(
            Engine::with_board(EngineConfig::default(), board).unwrap_err(),
            ConfigError::ColorNotInPalette(Color::Magenta)
        );
    }

    #[test]
    fn test_existing_run_cannot_make_a_dead_swap_stand() {
        let board = Board::from_rows(&["rgb", "gby", "rrr"]).unwrap();
        assert!(Engine::with_board(EngineConfig::default(), board).is_err());

        // the same top row on a stable board: swapping r and g makes nothing
        let board = Board::from_rows(&["rgb", "gby", "ryr"]).unwrap();
        let mut engine = Engine::with_board(EngineConfig::default(), board).unwrap();
        let mut log = EventLog::new();
        assert_eq!(
            engine.request_swap(Coord::new(0, 2), Coord::new(1, 2), &mut log),
            Err(SwapError::Rejected {
                a: Coord::new(0, 2),
                b: Coord::new(1, 2)
            })
        );
        assert!(log.events.is_empty());
    }

    #[test]
    fn test_waits_for_every_landing() {
        let mut engine = engine_with(&[
            "gbg", //
            "ybr", //
            "rrb",
        ]);
        let mut log = EventLog::new();
        // (2,0) b <-> (2,1) r makes rrr on the bottom row
        assert_eq!(
            engine.request_swap(Coord::new(2, 0), Coord::new(2, 1), &mut log),
            Ok(true)
        );
        assert_eq!(engine.state(), CascadeState::Settling);
        assert_eq!(log.removed().count(), 3);
        assert_eq!(engine.falls_in_flight(), 6);

        let pending: Vec<Coord> = engine.pending_falls().collect();
        for coord in &pending[..5] {
            engine.on_fall_landed(*coord, &mut log).unwrap();
            assert_eq!(engine.state(), CascadeState::Settling);
        }
        assert_eq!(
            engine.request_swap(Coord::new(0, 0), Coord::new(1, 0), &mut log),
            Err(SwapError::Busy)
        );
        engine.on_fall_landed(pending[5], &mut log).unwrap();
        assert!(engine.is_idle());
        assert_eq!(log.events.last(), Some(&Event::CascadeIdle));
        assert!(is_settled(engine.board()));
    }

    #[test]
    fn test_double_landing_rejected() {
        let mut engine = engine_with(&[
            "gbg", //
            "ybr", //
            "rrb",
        ]);
        let mut log = EventLog::new();
        engine
            .request_swap(Coord::new(2, 0), Coord::new(2, 1), &mut log)
            .unwrap();
        let first = engine.pending_falls().next().unwrap();
        engine.on_fall_landed(first, &mut log).unwrap();
        assert_eq!(
            engine.on_fall_landed(first, &mut log),
            Err(FallError::FallNotPending(first))
        );
        assert_eq!(engine.falls_in_flight(), 5);
    }

    #[test]
    fn test_landing_while_idle() {
        let mut engine = engine_with(&["gbg", "ybr", "rgb"]);
        assert_eq!(
            engine.on_fall_landed(Coord::new(0, 0), &mut ()),
            Err(FallError::NotSettling)
        );
    }

    #[test]
    fn test_chain_reaction_runs_second_pass() {
        let mut engine = engine_with(&[
            "gbyb", //
            "gyby", //
            "rrbr", //
            "gyrg",
        ]);
        let mut log = EventLog::new();
        // rrr on row 1; the two greens above drop onto the green at (0,0)
        engine
            .request_swap(Coord::new(2, 1), Coord::new(3, 1), &mut log)
            .unwrap();
        assert_eq!(engine.falls_in_flight(), 6);
        engine.land_all_falls(&mut log);
        assert!(engine.is_idle());
        assert_eq!(engine.passes(), 2);
        assert_eq!(log.removed().count(), 6);
        assert!((0..3).all(|row| engine.board().color_at(Coord::new(0, row)).is_none()));
        assert!(find_matches(engine.board()).is_empty());
    }

    #[test]
    fn test_top_row_removal_needs_no_falls() {
        let mut engine = engine_with(&[
            "rrbr", //
            "gybg", //
            "ygyb", //
            "bgby",
        ]);
        let mut log = EventLog::new();
        engine
            .request_swap(Coord::new(2, 3), Coord::new(3, 3), &mut log)
            .unwrap();
        assert!(engine.is_idle());
        assert_eq!(log.falling().count(), 0);
        assert_eq!(log.events.last(), Some(&Event::CascadeIdle));
        assert_eq!(engine.board().occupied_count(), 13);
    }

    #[test]
    fn test_reset_deals_new_board() {
        let mut engine = engine_with(&["...", "...", "r.."]);
        engine.reset().unwrap();
        assert_eq!(engine.board().occupied_count(), 9);
        assert!(find_matches(engine.board()).is_empty());
    }
}
