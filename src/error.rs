//! Error types. All are local and recoverable except [`ConfigError`], which is
//! raised once when an engine is built.

use crate::board::Coord;
use thiserror::Error;

/// Direct grid writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("coordinate {0} is outside the board")]
    InvalidCoordinate(Coord),
}

/// Why a swap request was not applied. The board is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("coordinate {0} is outside the board")]
    InvalidCoordinate(Coord),

    #[error("cells {a} and {b} are not adjacent")]
    NonAdjacent { a: Coord, b: Coord },

    #[error("cell {0} holds no piece")]
    EmptyCell(Coord),

    #[error("swapping {a} and {b} makes no match")]
    Rejected { a: Coord, b: Coord },

    #[error("a cascade is still running")]
    Busy,
}

/// Errors from the landing acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallError {
    #[error("no falls are in flight")]
    NotSettling,

    #[error("no fall is pending at {0}")]
    FallNotPending(Coord),
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size must be at least 1")]
    InvalidSize,

    #[error("palette has {len} colours, at least {required} are needed")]
    PaletteTooSmall { len: usize, required: usize },

    #[error("palette lists {0:?} more than once")]
    DuplicateColor(crate::board::Color),

    #[error("board holds {0:?}, which is not in the palette")]
    ColorNotInPalette(crate::board::Color),

    #[error("board is not stable: it has a match or a piece over an empty cell")]
    BoardNotStable,
}
