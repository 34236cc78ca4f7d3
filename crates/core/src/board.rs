//! Board module - the locked-cell grid
//!
//! The board is a 10x20 grid where each cell is empty or holds the kind of the
//! piece that was locked there. The kind tag only drives coloring.
//! Uses a flat array for cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// Indices of full rows, bottom-to-top.
pub type FullRows = ArrayVec<usize, HEIGHT>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if Self::in_bounds(x, y) {
            Some((y as usize) * WIDTH + (x as usize))
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn in_bounds(x: i8, y: i8) -> bool {
        x >= 0 && (x as u8) < BOARD_WIDTH && y >= 0 && (y as u8) < BOARD_HEIGHT
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// True if (x, y) is in bounds and holds a locked cell.
    ///
    /// Out of bounds is not an error here: it reads as unoccupied. Collision
    /// callers combine this with their own bounds check.
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Tag a cell with a piece kind. Out-of-bounds writes are ignored.
    pub fn set_cell(&mut self, x: i8, y: i8, kind: PieceKind) {
        if let Some(idx) = Self::index(x, y) {
            self.cells[idx] = Some(kind);
        }
    }

    /// Row `y` as a slice of `BOARD_WIDTH` cells.
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * WIDTH;
        &self.cells[start..start + WIDTH]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        y < HEIGHT && self.row(y).iter().all(|cell| cell.is_some())
    }

    /// Indices of every full row, scanned bottom-to-top.
    pub fn full_rows(&self) -> FullRows {
        (0..HEIGHT).rev().filter(|&y| self.is_row_full(y)).collect()
    }

    /// Remove row `y`: every row above it moves down one and row 0 becomes empty.
    pub fn clear_row(&mut self, y: usize) {
        if y >= HEIGHT {
            return;
        }
        // copy_within handles the overlapping ranges
        self.cells.copy_within(0..y * WIDTH, WIDTH);
        self.cells[..WIDTH].fill(None);
    }

    /// Push every row down by one, dropping the bottom row, and empty row 0.
    pub fn insert_empty_row_at_top(&mut self) {
        self.cells.copy_within(0..BOARD_SIZE - WIDTH, WIDTH);
        self.cells[..WIDTH].fill(None);
    }

    /// Remove every full row in one pass and return how many were removed.
    ///
    /// Full rows are collected first, then surviving rows are compacted towards
    /// the bottom (each moves down by the number of removed rows beneath it) and
    /// the freed rows at the top are emptied. Non-contiguous clears are handled
    /// without rescanning shifted indices.
    pub fn clear_lines(&mut self) -> usize {
        let full = self.full_rows();
        if full.is_empty() {
            return 0;
        }

        let mut write_y = HEIGHT;
        for read_y in (0..HEIGHT).rev() {
            if full.contains(&read_y) {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * WIDTH;
                self.cells.copy_within(src..src + WIDTH, write_y * WIDTH);
            }
        }
        self.cells[..write_y * WIDTH].fill(None);

        full.len()
    }

    /// Write every offset of a piece into the grid tagged with `kind`.
    ///
    /// Callers are expected to have validated the placement first; cells that
    /// fall outside the board are skipped.
    pub fn lock_cells(&mut self, cells: impl IntoIterator<Item = (i8, i8)>, kind: PieceKind) {
        for (x, y) in cells {
            self.set_cell(x, y, kind);
        }
    }

    /// Number of locked cells on the board
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write the board as cell codes (0 = empty, 1..=7 = piece kind).
    pub fn write_u8_grid(&self, out: &mut [[u8; WIDTH]; HEIGHT]) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, code) in row.iter_mut().enumerate() {
                *code = self.cells[y * WIDTH + x].map_or(0, |k| k.code());
            }
        }
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a board from text rows, aligned to the bottom of the grid.
    ///
    /// `.` is empty; a piece letter (case-insensitive) is a locked cell of that
    /// kind; any other character is locked as `I`. Rows shorter than the board
    /// width are padded with empty cells.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new();
        let top = HEIGHT.saturating_sub(rows.len());
        for (i, text) in rows.iter().rev().take(HEIGHT).rev().enumerate() {
            let y = (top + i) as i8;
            for (x, ch) in text.chars().take(WIDTH).enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind = PieceKind::from_str(&ch.to_string()).unwrap_or(PieceKind::I);
                board.set_cell(x as i8, y, kind);
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i8, kind: PieceKind) {
        for x in 0..BOARD_WIDTH as i8 {
            board.set_cell(x, y, kind);
        }
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn out_of_bounds_reads_as_unoccupied() {
        let board = Board::from_rows(&["##########"]);
        assert!(board.is_occupied(0, 19));
        assert!(!board.is_occupied(-1, 19));
        assert!(!board.is_occupied(10, 19));
        assert!(!board.is_occupied(0, 20));
    }

    #[test]
    fn full_rows_are_listed_bottom_to_top() {
        let mut board = Board::new();
        fill_row(&mut board, 3, PieceKind::T);
        fill_row(&mut board, 17, PieceKind::L);
        fill_row(&mut board, 19, PieceKind::O);
        board.set_cell(0, 18, PieceKind::Z);

        assert_eq!(board.full_rows().as_slice(), &[19, 17, 3]);
    }

    #[test]
    fn clear_row_shifts_rows_above_down() {
        let mut board = Board::new();
        board.set_cell(2, 0, PieceKind::J);
        board.set_cell(4, 10, PieceKind::S);
        fill_row(&mut board, 11, PieceKind::I);

        board.clear_row(11);

        assert_eq!(board.get(2, 1), Some(Some(PieceKind::J)));
        assert_eq!(board.get(4, 11), Some(Some(PieceKind::S)));
        assert!(board.row(0).iter().all(Option::is_none));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn insert_empty_row_at_top_drops_bottom_row() {
        let mut board = Board::new();
        fill_row(&mut board, 19, PieceKind::I);
        board.set_cell(5, 0, PieceKind::T);

        board.insert_empty_row_at_top();

        assert!(board.row(0).iter().all(Option::is_none));
        assert_eq!(board.get(5, 1), Some(Some(PieceKind::T)));
        assert_eq!(board.filled_count(), 1);
    }

    #[test]
    fn clear_lines_handles_non_contiguous_rows() {
        let mut board = Board::new();
        for y in 0..BOARD_HEIGHT as i8 {
            // Mark each row with a distinct column so shifts are traceable.
            board.set_cell(y % 10, y, PieceKind::Z);
        }
        fill_row(&mut board, 2, PieceKind::I);
        fill_row(&mut board, 5, PieceKind::I);
        let before = board.clone();

        assert_eq!(board.clear_lines(), 2);

        assert_eq!(board.row(5), before.row(4));
        assert_eq!(board.row(4), before.row(3));
        assert_eq!(board.row(3), before.row(1));
        assert_eq!(board.row(2), before.row(0));
        assert!(board.row(0).iter().all(Option::is_none));
        assert!(board.row(1).iter().all(Option::is_none));
        for y in 6..HEIGHT {
            assert_eq!(board.row(y), before.row(y));
        }
    }

    #[test]
    fn clear_lines_removes_four_stacked_rows() {
        let mut board = Board::new();
        for y in 16..20 {
            fill_row(&mut board, y, PieceKind::I);
        }
        board.set_cell(7, 15, PieceKind::L);

        assert_eq!(board.clear_lines(), 4);
        assert_eq!(board.filled_count(), 1);
        assert_eq!(board.get(7, 19), Some(Some(PieceKind::L)));
    }

    #[test]
    fn clear_lines_on_board_without_full_rows_is_noop() {
        let mut board = Board::from_rows(&["#########.", "##.#######"]);
        let before = board.clone();
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn from_rows_aligns_to_bottom_and_keeps_kind_tags() {
        let board = Board::from_rows(&["t.........", "....LL...."]);
        assert_eq!(board.get(0, 18), Some(Some(PieceKind::T)));
        assert_eq!(board.get(4, 19), Some(Some(PieceKind::L)));
        assert_eq!(board.get(3, 19), Some(None));
        assert_eq!(board.filled_count(), 3);
    }

    #[test]
    fn u8_grid_uses_piece_codes() {
        let mut board = Board::new();
        board.set_cell(0, 0, PieceKind::I);
        board.set_cell(9, 19, PieceKind::L);
        let mut grid = [[0u8; WIDTH]; HEIGHT];
        board.write_u8_grid(&mut grid);
        assert_eq!(grid[0][0], 1);
        assert_eq!(grid[19][9], 7);
        assert_eq!(grid[10][5], 0);
    }
}
