//! Read-only view of a session for renderers and observers.
//!
//! A snapshot is plain `Copy` data: the locked grid as `u8` codes
//! (`0` = empty, otherwise [`PieceKind::code`]), the active piece with its
//! current matrix, the ghost row, the queued kind and the counters.

use crate::piece::ActivePiece;
use crate::shapes::ShapeMatrix;
use crate::types::{GameMode, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    pub shape: ShapeMatrix,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
            shape: value.shape(),
        }
    }
}

impl Default for ActiveSnapshot {
    fn default() -> Self {
        ActivePiece::spawn(PieceKind::I).into()
    }
}

impl ActiveSnapshot {
    /// Absolute board cells of the piece at row `y`.
    pub fn cells_at(&self, y: i8) -> impl Iterator<Item = (i8, i8)> + '_ {
        let x = self.x;
        self.shape.filled().map(move |(dx, dy)| (x + dx, y + dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: ActiveSnapshot,
    pub ghost_y: i8,
    pub next: PieceKind,
    pub score: u32,
    pub mode: GameMode,
    pub episode_id: u32,
    pub piece_id: u32,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: ActiveSnapshot::default(),
            ghost_y: 0,
            next: PieceKind::I,
            score: 0,
            mode: GameMode::Playing,
            episode_id: 0,
            piece_id: 0,
        }
    }
}

impl GameSnapshot {
    pub fn game_over(&self) -> bool {
        self.mode == GameMode::GameOver
    }

    /// Piece kind locked at `(x, y)`, if any.
    pub fn locked_at(&self, x: usize, y: usize) -> Option<PieceKind> {
        self.board
            .get(y)
            .and_then(|row| row.get(x))
            .and_then(|&code| PieceKind::from_code(code))
    }
}
