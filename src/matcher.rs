//! Match detection: runs of three or more same-coloured pieces.

use crate::board::{Board, Color, Coord};
use std::collections::BTreeSet;

/// Matched cells, ordered column then row. Overlapping runs collapse.
pub type MatchSet = BTreeSet<Coord>;

/// Shortest run that counts as a match, anchor included.
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn step(self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }
}

/// Walk from `start` in one direction while the next cell holds `color`.
///
/// The start cell is not part of the result; a caller treating the run as a
/// match must add it.
pub fn run_length(board: &Board, start: Coord, color: Color, direction: Direction) -> Vec<Coord> {
    let (dc, dr) = direction.step();
    let mut run = Vec::new();
    let (mut c, mut r) = (start.column as isize + dc, start.row as isize + dr);
    while board.get(c, r).holds(color) {
        run.push(Coord::new(c as usize, r as usize));
        c += dc;
        r += dr;
    }
    run
}

/// Every cell that belongs to a horizontal or vertical run of at least
/// [`MIN_RUN`].
///
/// Each occupied cell anchors a rightward and an upward walk, so a run is
/// always found from its first cell even when its middle cells are scanned
/// earlier.
pub fn find_matches(board: &Board) -> MatchSet {
    let mut matched = MatchSet::new();
    for anchor in board.coords() {
        let Some(color) = board.color_at(anchor) else {
            continue;
        };
        for direction in [Direction::Right, Direction::Up] {
            let run = run_length(board, anchor, color, direction);
            if run.len() + 1 >= MIN_RUN {
                matched.extend(run);
                matched.insert(anchor);
            }
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_excludes_start() {
        let board = Board::from_rows(&["....", "....", "....", "rrrb"]).unwrap();
        let run = run_length(&board, Coord::new(0, 0), Color::Red, Direction::Right);
        assert_eq!(run, vec![Coord::new(1, 0), Coord::new(2, 0)]);
        let back = run_length(&board, Coord::new(2, 0), Color::Red, Direction::Left);
        assert_eq!(back, vec![Coord::new(1, 0), Coord::new(0, 0)]);
    }

    #[test]
    fn test_run_stops_at_edge_and_empty() {
        let board = Board::from_rows(&["r..", "r..", "r.."]).unwrap();
        assert!(run_length(&board, Coord::new(0, 2), Color::Red, Direction::Up).is_empty());
        assert_eq!(
            run_length(&board, Coord::new(0, 2), Color::Red, Direction::Down).len(),
            2
        );
        assert!(run_length(&board, Coord::new(0, 0), Color::Red, Direction::Right).is_empty());
    }

    #[test]
    fn test_pair_is_not_a_match() {
        let board = Board::from_rows(&["...", "...", "rr."]).unwrap();
        assert!(find_matches(&board).is_empty());
    }

    #[test]
    fn test_horizontal_and_vertical() {
        let board = Board::from_rows(&["g...", "g...", "g...", "yyyb"]).unwrap();
        let expected: MatchSet = [(0, 1), (0, 2), (0, 3), (0, 0), (1, 0), (2, 0)]
            .into_iter()
            .map(|(c, r)| Coord::new(c, r))
            .collect();
        assert_eq!(find_matches(&board), expected);
    }

    #[test]
    fn test_overlapping_runs_merge() {
        let board = Board::from_rows(&[".r.", ".r.", "rrr"]).unwrap();
        let matched = find_matches(&board);
        assert_eq!(matched.len(), 5);
        assert!(matched.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn test_long_run_fully_matched() {
        let board = Board::from_rows(&[".....", ".....", ".....", ".....", "bbbbb"]).unwrap();
        assert_eq!(find_matches(&board).len(), 5);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let board = Board::from_rows(&["rgb", "rgb", "ryy"]).unwrap();
        let first = find_matches(&board);
        assert_eq!(first, find_matches(&board));
        assert_eq!(first.len(), 3);
    }
}
