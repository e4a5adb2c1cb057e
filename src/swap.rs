//! Swap validation: exchange two adjacent pieces, keep the swap only if it
//! creates a match somewhere on the board.

use crate::board::{Board, Coord};
use crate::error::SwapError;
use crate::matcher::{MatchSet, find_matches};

/// Outcome of a swap that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapVerdict {
    /// A cell swapped with itself; nothing happened.
    Ignored,
    /// The swap stands; these cells now form matches.
    Accepted(MatchSet),
}

/// Try to swap `a` and `b`.
///
/// On rejection the board is restored to exactly its prior state.
pub fn attempt_swap(board: &mut Board, a: Coord, b: Coord) -> Result<SwapVerdict, SwapError> {
    for coord in [a, b] {
        if !board.contains(coord) {
            return Err(SwapError::InvalidCoordinate(coord));
        }
    }
    if a == b {
        return Ok(SwapVerdict::Ignored);
    }
    if !a.is_adjacent(b) {
        return Err(SwapError::NonAdjacent { a, b });
    }
    for coord in [a, b] {
        if board.color_at(coord).is_none() {
            return Err(SwapError::EmptyCell(coord));
        }
    }

    board.swap_cells(a, b);
    let matched = find_matches(board);
    if matched.is_empty() {
        board.swap_cells(a, b);
        return Err(SwapError::Rejected { a, b });
    }
    Ok(SwapVerdict::Accepted(matched))
}
