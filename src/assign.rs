//! Initial colour assignment without pre-existing matches.

use crate::board::{Board, Color, Coord};
use crate::config::MIN_PALETTE;
use crate::error::ConfigError;
use rand::Rng;

/// Fill every cell of `board` with a random palette colour such that no run of
/// three exists afterwards.
///
/// Cells are filled column by column from the bottom, so the two cells to the
/// left and the two cells below are always final. If either pair shares a
/// colour, that colour is removed from the candidates for this cell.
pub fn assign_colors<R: Rng + ?Sized>(
    board: &mut Board,
    palette: &[Color],
    rng: &mut R,
) -> Result<(), ConfigError> {
    if palette.len() < MIN_PALETTE {
        return Err(ConfigError::PaletteTooSmall {
            len: palette.len(),
            required: MIN_PALETTE,
        });
    }
    let size = board.size();
    let mut candidates = Vec::with_capacity(palette.len());
    for column in 0..size {
        for row in 0..size {
            candidates.clear();
            candidates.extend_from_slice(palette);
            let (c, r) = (column as isize, row as isize);

            if let Some(left) = look_back_pair(board, (c - 1, r), (c - 2, r)) {
                candidates.retain(|&color| color != left);
            }
            if let Some(down) = look_back_pair(board, (c, r - 1), (c, r - 2)) {
                candidates.retain(|&color| color != down);
            }

            let pick = candidates[rng.random_range(0..candidates.len())];
            board.put(Coord::new(column, row), Some(pick));
        }
    }
    Ok(())
}

/// Colour shared by both cells, if both hold the same piece.
fn look_back_pair(board: &Board, near: (isize, isize), far: (isize, isize)) -> Option<Color> {
    let far = board.get(far.0, far.1).color()?;
    board.get(near.0, near.1).holds(far).then_some(far)
}
