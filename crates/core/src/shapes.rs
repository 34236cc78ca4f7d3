//! Shapes module - the piece catalog and the quarter-turn transform
//!
//! Each kind has one immutable base matrix (its spawn orientation) and a display
//! color. Rotated orientations are never stored: a falling piece carries its own
//! rotation and asks for the transient matrix when it needs it, so rotating one
//! piece can never leak into the catalog or into another piece of the same kind.

use crate::types::{PieceKind, Rotation};

/// Largest bounding box side of any catalog shape.
pub const MAX_DIM: usize = 4;

/// Boolean occupancy matrix with variable dimensions (up to 4x4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    rows: u8,
    cols: u8,
    bits: [[bool; MAX_DIM]; MAX_DIM],
}

impl ShapeMatrix {
    /// Build a matrix from 0/1 rows; entries outside `rows x cols` are ignored.
    pub const fn from_grid(rows: u8, cols: u8, grid: [[u8; MAX_DIM]; MAX_DIM]) -> Self {
        let mut bits = [[false; MAX_DIM]; MAX_DIM];
        let mut r = 0;
        while r < rows as usize {
            let mut c = 0;
            while c < cols as usize {
                bits[r][c] = grid[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self { rows, cols, bits }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Occupancy at (row, col); false outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows as usize && col < self.cols as usize && self.bits[row][col]
    }

    /// Rotate a quarter turn clockwise: `R x C` becomes `C x R` with
    /// `out[i][j] = self[R - 1 - j][i]`.
    pub fn rotate_cw(&self) -> Self {
        let r = self.rows as usize;
        let c = self.cols as usize;
        let mut bits = [[false; MAX_DIM]; MAX_DIM];
        for (i, out_row) in bits.iter_mut().enumerate().take(c) {
            for (j, out) in out_row.iter_mut().enumerate().take(r) {
                *out = self.bits[r - 1 - j][i];
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            bits,
        }
    }

    /// Offsets `(dx, dy)` of every occupied cell, row-major.
    pub fn filled(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        (0..self.rows as usize).flat_map(move |row| {
            (0..self.cols as usize)
                .filter(move |&col| self.bits[row][col])
                .map(move |col| (col as i8, row as i8))
        })
    }

    /// Rows as 0/1 vectors (wire and debug output).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows as usize)
            .map(|row| {
                (0..self.cols as usize)
                    .map(|col| self.bits[row][col] as u8)
                    .collect()
            })
            .collect()
    }
}

const I_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    1,
    4,
    [[1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const O_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    2,
    2,
    [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const T_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    2,
    3,
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const S_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    2,
    3,
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const Z_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    2,
    3,
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const J_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    2,
    3,
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const L_BASE: ShapeMatrix = ShapeMatrix::from_grid(
    2,
    3,
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

/// Spawn-orientation matrix for a kind.
pub fn base_shape(kind: PieceKind) -> ShapeMatrix {
    match kind {
        PieceKind::I => I_BASE,
        PieceKind::O => O_BASE,
        PieceKind::T => T_BASE,
        PieceKind::S => S_BASE,
        PieceKind::Z => Z_BASE,
        PieceKind::J => J_BASE,
        PieceKind::L => L_BASE,
    }
}

/// Matrix for a kind at a given rotation, computed from the base on demand.
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> ShapeMatrix {
    let mut shape = base_shape(kind);
    for _ in 0..rotation.quarter_turns() {
        shape = shape.rotate_cw();
    }
    shape
}

/// Display color (RGB) of a kind.
pub fn color(kind: PieceKind) -> [u8; 3] {
    match kind {
        PieceKind::I => [0, 255, 255],
        PieceKind::O => [255, 255, 0],
        PieceKind::T => [255, 0, 255],
        PieceKind::S => [0, 255, 0],
        PieceKind::Z => [255, 0, 0],
        PieceKind::J => [0, 0, 255],
        PieceKind::L => [255, 165, 0],
    }
}
