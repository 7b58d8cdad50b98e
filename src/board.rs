use ndarray::{s, Array2};

use crate::constants::{Color, COLS, ROWS};
use crate::piece::Piece;

/// The settled-block grid, indexed `[row, col]` with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Array2<Option<Color>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: Array2::default([ROWS, COLS]),
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Color> {
        self.cells.get([row, col]).copied().flatten()
    }

    /// Every settled cell as `((col, row), color)`.
    pub fn occupied_cells(&self) -> impl Iterator<Item = ((usize, usize), Color)> + '_ {
        self.cells
            .indexed_iter()
            .filter_map(|((row, col), cell)| cell.map(|c| ((col, row), c)))
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Whether `piece` moved by `(dx, dy)` would hit a wall, the floor or a
    /// settled cell. Cells above the top edge never collide.
    pub fn is_collision(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        let (rows, cols) = (self.rows() as i32, self.cols() as i32);
        piece.coords(dx, dy).any(|(col, row)| {
            col < 0
                || col >= cols
                || row >= rows
                || (row >= 0 && self.cells[[row as usize, col as usize]].is_some())
        })
    }

    /// Stamps the piece's color into the grid. Must be called once per piece.
    pub fn merge(&mut self, piece: &Piece) {
        for (col, row) in piece.coords(0, 0) {
            if row < 0 || col < 0 {
                continue;
            }
            if let Some(cell) = self.cells.get_mut([row as usize, col as usize]) {
                *cell = Some(piece.color);
            }
        }
    }

    /// Removes every full row, dropping the rows above it down by one.
    /// Returns how many rows were removed.
    pub fn clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.rows();
        while y > 0 {
            let row = y - 1;
            if self.cells.row(row).iter().all(Option::is_some) {
                self.remove_row(row);
                cleared += 1;
                // The row that dropped into `row` has to be checked too.
                continue;
            }
            y -= 1;
        }
        cleared
    }

    fn remove_row(&mut self, row: usize) {
        let above = self.cells.slice(s![..row, ..]).to_owned();
        self.cells.slice_mut(s![1..=row, ..]).assign(&above);
        self.cells.row_mut(0).fill(None);
    }

    #[cfg(test)]
    pub fn set(&mut self, col: usize, row: usize, color: Option<Color>) {
        self.cells[[row, col]] = color;
    }

    #[cfg(test)]
    pub fn fill_row(&mut self, row: usize, color: Color) {
        self.cells.row_mut(row).fill(Some(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Shape;

    fn o_piece(x: i32, y: i32) -> Piece {
        Piece::new(Shape::O, Color::Yellow).with_pos(x, y)
    }

    #[test]
    fn new_board_is_empty() {
        let board = Board::new();
        assert_eq!((board.rows(), board.cols()), (ROWS, COLS));
        assert_eq!(board.occupied_cells().count(), 0);
    }

    #[test]
    fn walls_and_floor_collide() {
        let board = Board::new();
        let piece = o_piece(0, 18);
        assert!(!board.is_collision(&piece, 0, 0));
        assert!(board.is_collision(&piece, -1, 0));
        assert!(board.is_collision(&piece, 0, 1));
        assert!(board.is_collision(&o_piece(8, 0), 1, 0));
        assert!(!board.is_collision(&o_piece(8, 0), 0, 0));
    }

    #[test]
    fn above_the_top_is_not_a_collision() {
        let board = Board::new();
        assert!(!board.is_collision(&o_piece(4, -2), 0, 0));
        assert!(!board.is_collision(&o_piece(4, 0), 0, -1));
    }

    #[test]
    fn settled_cells_collide() {
        let mut board = Board::new();
        board.set(5, 10, Some(Color::Blue));
        assert!(board.is_collision(&o_piece(4, 9), 0, 0));
        assert!(board.is_collision(&o_piece(4, 8), 0, 1));
        assert!(!board.is_collision(&o_piece(4, 8), 0, 0));
        assert!(!board.is_collision(&o_piece(6, 9), 0, 0));
    }

    #[test]
    fn collision_matches_cell_by_cell_definition() {
        let mut board = Board::new();
        board.set(3, 19, Some(Color::Rose));
        board.set(7, 5, Some(Color::Rose));
        for kind in Shape::all() {
            let piece = Piece::new(kind, Color::Green);
            for x in -3..12 {
                for y in -3..22 {
                    let piece = piece.clone().with_pos(x, y);
                    let expected = !piece.coords(0, 0).all(|(c, r)| {
                        (0..COLS as i32).contains(&c)
                            && r < ROWS as i32
                            && (r < 0 || board.cell(c as usize, r as usize).is_none())
                    });
                    assert_eq!(board.is_collision(&piece, 0, 0), expected);
                }
            }
        }
    }

    #[test]
    fn merge_stamps_piece_color() {
        let mut board = Board::new();
        board.merge(&o_piece(4, 18));
        assert_eq!(board.occupied_cells().count(), 4);
        assert_eq!(board.cell(4, 18), Some(Color::Yellow));
        assert_eq!(board.cell(5, 19), Some(Color::Yellow));
        assert_eq!(board.cell(3, 19), None);
    }

    #[test]
    fn clear_lines_without_full_rows_is_a_no_op() {
        let mut board = Board::new();
        board.set(0, 19, Some(Color::Blue));
        board.set(9, 10, Some(Color::Green));
        let before = board.clone();
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn clear_lines_removes_full_rows_and_keeps_order() {
        let mut board = Board::new();
        board.fill_row(19, Color::Blue);
        board.set(2, 18, Some(Color::Rose));
        board.fill_row(17, Color::Blue);
        board.set(7, 16, Some(Color::Green));

        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board.occupied_cells().count(), 2);
        assert_eq!(board.cell(2, 19), Some(Color::Rose));
        assert_eq!(board.cell(7, 18), Some(Color::Green));
        for row in 0..18 {
            for col in 0..COLS {
                assert_eq!(board.cell(col, row), None);
            }
        }
    }

    #[test]
    fn clear_lines_rechecks_row_after_removal() {
        let mut board = Board::new();
        for row in 16..20 {
            board.fill_row(row, Color::Violet);
        }
        board.set(0, 15, Some(Color::Cyan));
        assert_eq!(board.clear_lines(), 4);
        assert_eq!(board.occupied_cells().count(), 1);
        assert_eq!(board.cell(0, 19), Some(Color::Cyan));
    }

    #[test]
    fn clear_resets_every_cell() {
        let mut board = Board::new();
        board.fill_row(3, Color::Orange);
        board.clear();
        assert_eq!(board, Board::new());
    }
}
