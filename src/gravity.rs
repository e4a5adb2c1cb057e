//! Gravity: compact columns so no empty cell sits below a piece.

use crate::board::{Board, Color, Coord};

/// One piece dropping from `from_row` to `to_row` in a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub column: usize,
    pub from_row: usize,
    pub to_row: usize,
    pub color: Color,
}

impl Fall {
    /// Cell the piece lands in.
    #[inline]
    pub fn target(&self) -> Coord {
        Coord::new(self.column, self.to_row)
    }

    #[inline]
    pub fn distance(&self) -> usize {
        self.from_row - self.to_row
    }
}

/// Compact one column from the ground up.
///
/// For every empty cell, the nearest piece above it drops straight into it.
/// Pieces keep their bottom-to-top order. Returns the moves in the order they
/// were made (lowest target first). Out-of-range columns yield no moves.
pub fn compact_column(board: &mut Board, column: usize) -> Vec<Fall> {
    let size = board.size();
    let mut falls = Vec::new();
    if column >= size {
        return falls;
    }
    for to_row in 0..size {
        if board.color_at(Coord::new(column, to_row)).is_some() {
            continue;
        }
        let source = (to_row + 1..size)
            .find_map(|row| board.color_at(Coord::new(column, row)).map(|color| (row, color)));
        let Some((from_row, color)) = source else {
            // nothing left above
            break;
        };
        board.put(Coord::new(column, from_row), None);
        board.put(Coord::new(column, to_row), Some(color));
        falls.push(Fall {
            column,
            from_row,
            to_row,
            color,
        });
    }
    falls
}

/// Compact every column. Columns are independent.
pub fn compact_all(board: &mut Board) -> Vec<Fall> {
    (0..board.size())
        .flat_map(|column| compact_column(board, column))
        .collect()
}

/// True when no column has an empty cell below a piece.
pub fn is_settled(board: &Board) -> bool {
    (0..board.size()).all(|column| {
        let mut seen_empty = false;
        for row in 0..board.size() {
            match board.color_at(Coord::new(column, row)) {
                None => seen_empty = true,
                Some(_) if seen_empty => return false,
                Some(_) => {}
            }
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_keeps_order() {
        let mut board = Board::new(8);
        board.set(Coord::new(2, 0), Some(Color::Red)).unwrap();
        board.set(Coord::new(2, 2), Some(Color::Green)).unwrap();
        board.set(Coord::new(2, 5), Some(Color::Blue)).unwrap();

        let falls = compact_column(&mut board, 2);

        assert_eq!(
            falls,
            vec![
                Fall { column: 2, from_row: 2, to_row: 1, color: Color::Green },
                Fall { column: 2, from_row: 5, to_row: 2, color: Color::Blue },
            ]
        );
        let occupied: Vec<(usize, Color)> = (0..8)
            .filter_map(|row| board.color_at(Coord::new(2, row)).map(|c| (row, c)))
            .collect();
        assert_eq!(
            occupied,
            vec![(0, Color::Red), (1, Color::Green), (2, Color::Blue)]
        );
        assert!(is_settled(&board));
    }

    #[test]
    fn test_full_column_has_no_falls() {
        let mut board = Board::from_rows(&["r..", "g..", "b.."]).unwrap();
        assert!(compact_column(&mut board, 0).is_empty());
        assert!(compact_column(&mut board, 1).is_empty());
        assert!(compact_column(&mut board, 9).is_empty());
    }

    #[test]
    fn test_piece_drops_through_gap_in_one_move() {
        let mut board = Board::from_rows(&["y...", "....", "....", "...."]).unwrap();
        let falls = compact_column(&mut board, 0);
        assert_eq!(falls.len(), 1);
        assert_eq!(falls[0].distance(), 3);
        assert_eq!(falls[0].target(), Coord::new(0, 0));
    }

    #[test]
    fn test_columns_are_independent() {
        let mut board = Board::from_rows(&["rg.", "...", "..b"]).unwrap();
        let falls = compact_all(&mut board);
        assert_eq!(falls.len(), 2);
        assert_eq!(board.to_string(), "...\n...\nrgb");
    }

    #[test]
    fn test_is_settled_detects_hole() {
        let board = Board::from_rows(&["r..", "...", "g.."]).unwrap();
        assert!(!is_settled(&board));
    }
}
