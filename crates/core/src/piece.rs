//! Active piece module - the falling piece and its collision rule
//!
//! [`is_valid_placement`] is the only collision predicate in the engine. Moves,
//! rotation, hard drop, ghost projection and spawn checks all go through it.
//! Every action is checked and silently rejected when illegal; nothing here
//! returns an error.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::shapes::{base_shape, get_shape, ShapeMatrix};
use crate::types::{PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// True when every occupied cell of `shape`, anchored at `(x, y)`, lies inside
/// the board and on an empty cell. An all-empty shape is vacuously valid.
pub fn is_valid_placement(board: &Board, shape: &ShapeMatrix, x: i8, y: i8) -> bool {
    shape.filled().all(|(dx, dy)| {
        let (bx, by) = (x + dx, y + dy);
        bx >= 0
            && bx < BOARD_WIDTH as i8
            && by >= 0
            && by < BOARD_HEIGHT as i8
            && !board.is_occupied(bx, by)
    })
}

/// The currently falling piece: kind, its own rotation, and the top-left anchor
/// of its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Create a piece at its spawn anchor: horizontally centered, top row.
    pub fn spawn(kind: PieceKind) -> Self {
        let width = base_shape(kind).cols() as i8;
        Self {
            kind,
            rotation: Rotation::North,
            x: (BOARD_WIDTH / 2) as i8 - width / 2,
            y: 0,
        }
    }

    /// Matrix for this instance's rotation.
    pub fn shape(&self) -> ShapeMatrix {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> {
        let (x, y) = (self.x, self.y);
        let shape = self.shape();
        let offsets: ArrayVec<(i8, i8), 16> = shape.filled().collect();
        offsets.into_iter().map(move |(dx, dy)| (x + dx, y + dy))
    }

    /// Whether the piece fits where it currently is.
    pub fn is_valid(&self, board: &Board) -> bool {
        is_valid_placement(board, &self.shape(), self.x, self.y)
    }

    /// Shift horizontally by `dx` columns if the target placement is valid.
    pub fn try_shift(&mut self, board: &Board, dx: i8) -> bool {
        if is_valid_placement(board, &self.shape(), self.x + dx, self.y) {
            self.x += dx;
            true
        } else {
            false
        }
    }

    /// Fall one row if possible. A `false` return means the piece is resting.
    pub fn try_drop(&mut self, board: &Board) -> bool {
        if is_valid_placement(board, &self.shape(), self.x, self.y + 1) {
            self.y += 1;
            true
        } else {
            false
        }
    }

    /// Turn a quarter clockwise in place. The anchor never moves (no kicks).
    pub fn try_rotate(&mut self, board: &Board) -> bool {
        let next = self.rotation.rotate_cw();
        let candidate = get_shape(self.kind, next);
        if is_valid_placement(board, &candidate, self.x, self.y) {
            self.rotation = next;
            true
        } else {
            false
        }
    }

    /// Drop row by row until blocked; returns the number of rows fallen.
    pub fn hard_drop(&mut self, board: &Board) -> u8 {
        let mut rows = 0;
        while self.try_drop(board) {
            rows += 1;
        }
        rows
    }

    /// Row the piece would rest on after a hard drop, leaving `self` untouched.
    pub fn ghost_y(&self, board: &Board) -> i8 {
        let mut probe = *self;
        probe.hard_drop(board);
        probe.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;

    #[test]
    fn spawn_is_centered_on_the_top_row() {
        assert_eq!(ActivePiece::spawn(PieceKind::I).x, 3);
        assert_eq!(ActivePiece::spawn(PieceKind::O).x, 4);
        assert_eq!(ActivePiece::spawn(PieceKind::T).x, 4);
        for kind in PieceKind::ALL {
            let piece = ActivePiece::spawn(kind);
            assert_eq!(piece.y, 0);
            assert_eq!(piece.rotation, Rotation::North);
        }
    }

    #[test]
    fn placement_rejects_walls_floor_ceiling_and_stack() {
        let board = Board::from_rows(&["....#....."]);
        let o = base_shape(PieceKind::O);

        assert!(is_valid_placement(&board, &o, 0, 0));
        assert!(!is_valid_placement(&board, &o, -1, 0));
        assert!(!is_valid_placement(&board, &o, 9, 0));
        assert!(!is_valid_placement(&board, &o, 0, -1));
        assert!(!is_valid_placement(&board, &o, 0, 19));
        assert!(is_valid_placement(&board, &o, 0, 18));
        // Overlaps the locked cell at (4, 19).
        assert!(!is_valid_placement(&board, &o, 3, 18));
    }

    #[test]
    fn empty_matrix_cells_may_hang_outside() {
        let board = Board::new();
        let right_column = ShapeMatrix::from_grid(
            2,
            2,
            [[0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
        );
        assert!(is_valid_placement(&board, &right_column, -1, 0));
        assert!(!is_valid_placement(&board, &right_column, 9, 0));
    }

    #[test]
    fn empty_shape_is_always_valid() {
        let board = Board::from_rows(&["##########"]);
        let empty = ShapeMatrix::from_grid(0, 0, [[0; 4]; 4]);
        assert!(is_valid_placement(&board, &empty, -5, 40));
    }

    #[test]
    fn shift_clamps_at_the_left_wall() {
        let board = Board::new();
        let mut piece = ActivePiece::spawn(PieceKind::I);
        for _ in 0..10 {
            piece.try_shift(&board, -1);
        }
        assert_eq!(piece.x, 0);
        assert!(!piece.try_shift(&board, -1));
        assert_eq!(piece.x, 0);
    }

    #[test]
    fn rotation_is_rejected_without_moving_the_anchor() {
        let board = Board::new();
        let mut piece = ActivePiece::spawn(PieceKind::I);
        // Vertical I needs four rows; put it on the floor row first.
        piece.hard_drop(&board);
        assert_eq!(piece.y, 19);
        assert!(!piece.try_rotate(&board));
        assert_eq!(piece.rotation, Rotation::North);
        assert_eq!((piece.x, piece.y), (3, 19));
    }

    #[test]
    fn rotation_is_per_instance() {
        let board = Board::new();
        let mut a = ActivePiece::spawn(PieceKind::L);
        let b = ActivePiece::spawn(PieceKind::L);

        assert!(a.try_rotate(&board));
        assert_eq!(a.rotation, Rotation::East);
        assert_eq!(b.rotation, Rotation::North);
        assert_eq!(b.shape(), base_shape(PieceKind::L));
    }

    #[test]
    fn ghost_matches_hard_drop_without_moving() {
        let board = Board::from_rows(&["...##.....", "..####...."]);
        let mut piece = ActivePiece::spawn(PieceKind::T);
        let ghost = piece.ghost_y(&board);
        assert_eq!(piece.y, 0);

        piece.hard_drop(&board);
        assert_eq!(piece.y, ghost);
        assert!(piece.is_valid(&board));
        assert!(!piece.try_drop(&board));
    }

    /// Random stack in the lower half, row density varying by seed.
    fn seeded_board(seed: u32) -> Board {
        let mut rng = SimpleRng::new(seed);
        let mut board = Board::new();
        let fill = 2 + rng.next_range(6);
        for y in 10..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                if rng.next_range(10) < fill {
                    board.set_cell(x, y, PieceKind::Z);
                }
            }
        }
        board
    }

    #[test]
    fn ghost_matches_hard_drop_for_every_kind_rotation_and_column() {
        let rotations = [Rotation::North, Rotation::East, Rotation::South, Rotation::West];
        let mut checked = 0;
        for seed in 1..=16 {
            let board = seeded_board(seed);
            for kind in PieceKind::ALL {
                for rotation in rotations {
                    for x in -3..BOARD_WIDTH as i8 {
                        let piece = ActivePiece { kind, rotation, x, y: 0 };
                        if !piece.is_valid(&board) {
                            continue;
                        }
                        let ghost = piece.ghost_y(&board);
                        let mut dropped = piece;
                        dropped.hard_drop(&board);
                        assert_eq!(dropped.y, ghost, "{:?} {:?} x={} seed={}", kind, rotation, x, seed);
                        assert!(dropped.is_valid(&board));
                        assert!(!is_valid_placement(&board, &dropped.shape(), x, ghost + 1));
                        checked += 1;
                    }
                }
            }
        }
        assert!(checked > 1_000);
    }

    #[test]
    fn cells_are_absolute() {
        let piece = ActivePiece::spawn(PieceKind::O);
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, vec![(4, 0), (5, 0), (4, 1), (5, 1)]);
    }
}
