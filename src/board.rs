//! Board: the size × size grid of optional piece colours.

use crate::error::GridError;
use std::fmt;

/// Piece colour. The palette in use is chosen by [`crate::EngineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
    ];

    /// The classic four-colour palette.
    pub const CLASSIC: [Self; 4] = [Self::Red, Self::Yellow, Self::Green, Self::Blue];

    /// Index 0..6, stable across palettes (used by the theme).
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Yellow => 1,
            Self::Green => 2,
            Self::Blue => 3,
            Self::Magenta => 4,
            Self::Cyan => 5,
        }
    }

    /// One-letter code used by the board dump and [`Board::from_rows`].
    pub fn letter(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Yellow => 'y',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Magenta => 'm',
            Self::Cyan => 'c',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.letter() == c)
    }
}

/// Cell coordinates. Row 0 is the ground; rows grow upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub column: usize,
    pub row: usize,
}

impl Coord {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Exactly one orthogonal step apart (no diagonals).
    pub fn is_adjacent(self, other: Self) -> bool {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Result of a grid lookup. Out-of-bounds is distinct from an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    OutOfBounds,
    Empty,
    Piece(Color),
}

impl Slot {
    /// True only for a piece of `color`; empty and out-of-bounds never match.
    #[inline]
    pub fn holds(self, color: Color) -> bool {
        self == Slot::Piece(color)
    }

    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Slot::Piece(c) => Some(c),
            _ => None,
        }
    }
}

/// Square grid of cells. `cells[column][row]`, row 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Vec<Option<Color>>>,
}

impl Board {
    /// All-empty board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![vec![None; size]; size],
        }
    }

    /// Build a board from text rows, top row first. `.` is empty, letters as
    /// in [`Color::letter`]; whitespace is ignored. Returns `None` if the rows
    /// do not form a square or hold an unknown character.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let size = rows.len();
        let mut board = Self::new(size);
        for (i, line) in rows.iter().enumerate() {
            let row = size - 1 - i;
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != size {
                return None;
            }
            for (column, ch) in cells.into_iter().enumerate() {
                board.cells[column][row] = match ch {
                    '.' => None,
                    c => Some(Color::from_letter(c)?),
                };
            }
        }
        Some(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.column < self.size && coord.row < self.size
    }

    /// Lookup by signed coordinates so callers can probe past the edges.
    pub fn get(&self, column: isize, row: isize) -> Slot {
        if column < 0 || row < 0 {
            return Slot::OutOfBounds;
        }
        let (column, row) = (column as usize, row as usize);
        if column >= self.size || row >= self.size {
            return Slot::OutOfBounds;
        }
        match self.cells[column][row] {
            Some(c) => Slot::Piece(c),
            None => Slot::Empty,
        }
    }

    #[inline]
    pub fn slot(&self, coord: Coord) -> Slot {
        self.get(coord.column as isize, coord.row as isize)
    }

    /// Colour at an in-bounds cell; `None` for empty or out-of-bounds.
    #[inline]
    pub fn color_at(&self, coord: Coord) -> Option<Color> {
        self.slot(coord).color()
    }

    /// Overwrite one cell unconditionally.
    pub fn set(&mut self, coord: Coord, color: Option<Color>) -> Result<(), GridError> {
        if !self.contains(coord) {
            return Err(GridError::InvalidCoordinate(coord));
        }
        self.cells[coord.column][coord.row] = color;
        Ok(())
    }

    /// Write an in-bounds cell; callers iterate within `0..size`.
    #[inline]
    pub(crate) fn put(&mut self, coord: Coord, color: Option<Color>) {
        self.cells[coord.column][coord.row] = color;
    }

    /// Exchange two in-bounds cells.
    pub(crate) fn swap_cells(&mut self, a: Coord, b: Coord) {
        let tmp = self.cells[a.column][a.row];
        self.cells[a.column][a.row] = self.cells[b.column][b.row];
        self.cells[b.column][b.row] = tmp;
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Every coordinate, column-major from the bottom-left.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.size).flat_map(move |column| (0..self.size).map(move |row| Coord::new(column, row)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.size).rev() {
            for column in 0..self.size {
                let ch = self.cells[column][row].map_or('.', Color::letter);
                write!(f, "{ch}")?;
            }
            if row > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
