//! Droptui: rule engine for a match-3 drop puzzle.
//!
//! The engine owns a square board of coloured pieces. A player swaps two
//! orthogonally adjacent pieces; any run of three or more same-coloured
//! pieces in a row or column is removed, the pieces above drop into the gaps,
//! and the remove → fall → re-check loop repeats until the board is stable.
//!
//! Presentation is kept outside the engine. The [`cascade::Engine`] reports
//! removals and falls through a [`cascade::CascadeListener`] and waits for the
//! presenter to acknowledge every landing before it re-scans the board.
//!
//! - [`board`]: the grid and its coordinate lookup
//! - [`assign`]: initial colours without pre-existing matches
//! - [`matcher`]: full-board and directional match detection
//! - [`swap`]: adjacency check and transactional swap
//! - [`gravity`]: column compaction into fall moves
//! - [`cascade`]: the Idle / Resolving / Settling / Rechecking controller
//! - [`config`]: board size, palette and seed
//! - [`error`]: recoverable error types

pub mod assign;
pub mod board;
pub mod cascade;
pub mod config;
pub mod error;
pub mod gravity;
pub mod matcher;
pub mod swap;

pub use board::{Board, Color, Coord, Slot};
pub use cascade::{CascadeListener, CascadeState, Engine, Event, EventLog};
pub use config::EngineConfig;
pub use error::{ConfigError, FallError, GridError, SwapError};
pub use gravity::Fall;
pub use matcher::MatchSet;
pub use swap::SwapVerdict;
