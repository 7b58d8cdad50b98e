use nanorand::{RandomGen, Rng};
use ndarray::{s, Array2, ArrayView2};

use crate::constants::{Color, Shape, COLS};

/// A falling piece. `x`/`y` are the board position of the matrix's top-left
/// cell and may be negative while the piece pokes out above the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub shape: Array2<bool>,
    pub color: Color,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Places `kind` at the top of the board, horizontally centered.
    pub fn new(kind: Shape, color: Color) -> Self {
        let shape = kind.shape().to_owned();
        let x = (COLS / 2) as i32 - (shape.ncols() / 2) as i32;
        Self {
            shape,
            color,
            x,
            y: 0,
        }
    }

    pub fn with_pos(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Board coordinates `(col, row)` of every occupied cell, offset by `(dx, dy)`.
    pub fn coords(&self, dx: i32, dy: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .indexed_iter()
            .filter_map(move |((row, col), v)| {
                v.then_some((self.x + col as i32 + dx, self.y + row as i32 + dy))
            })
    }
}

impl<Generator: Rng<OUTPUT>, const OUTPUT: usize> RandomGen<Generator, OUTPUT> for Piece {
    fn random(rng: &mut Generator) -> Self {
        // Shape and color are separate draws.
        let kind: Shape = rng.generate();
        let color: Color = rng.generate();
        Piece::new(kind, color)
    }
}

pub fn create_piece<R: Rng<OUTPUT>, const OUTPUT: usize>(rng: &mut R) -> Piece {
    rng.generate()
}

/// Rotates a matrix 90 degrees clockwise: transpose, then reverse every row.
pub fn rotate(shape: ArrayView2<bool>) -> Array2<bool> {
    shape.t().slice(s![.., ..;-1]).to_owned()
}
