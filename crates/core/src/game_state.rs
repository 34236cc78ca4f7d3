//! Game state module - the play session
//!
//! Ties together the board, the falling piece, the piece source and scoring,
//! and runs the PLAYING / GAME_OVER state machine.
//!
//! [`GameState::tick`] is the whole update step: given the current time and the
//! actions that arrived since the last call, it applies the actions in order,
//! then lets gravity fire if more than [`DROP_INTERVAL_MS`] has passed since the
//! last automatic fall. It never blocks and never reads a clock itself.

use crate::board::Board;
use crate::piece::ActivePiece;
use crate::rng::{PieceSource, UniformPieces};
use crate::scoring::line_clear_score;
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;

/// What a single [`GameState::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Gravity moved the piece down one row.
    pub fell: bool,
    /// Gravity found the piece resting and locked it.
    pub lock: Option<LockEvent>,
    /// A quit was requested (now or earlier); the host should stop.
    pub quit: bool,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState<S = UniformPieces> {
    board: Board,
    active: ActivePiece,
    next: PieceKind,
    source: S,
    score: u32,
    mode: GameMode,
    quit: bool,
    /// Timestamp (ms) of the last automatic fall attempt.
    last_fall_ms: u64,
    /// Increments on every reset.
    episode_id: u32,
    /// Increments on every spawn.
    piece_id: u32,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
}

impl GameState<UniformPieces> {
    /// Create a new session drawing uniformly random pieces from `seed`.
    pub fn new(seed: u32) -> Self {
        Self::with_source(UniformPieces::new(seed))
    }

    pub fn seed(&self) -> u32 {
        self.source.seed()
    }
}

impl Default for GameState<UniformPieces> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<S: PieceSource> GameState<S> {
    /// Create a session on an empty board with a custom piece source.
    pub fn with_source(source: S) -> Self {
        Self::with_board(Board::new(), source)
    }

    /// Start from a prepared board. The first piece spawns immediately and the
    /// session is already over if it does not fit.
    pub fn with_board(board: Board, mut source: S) -> Self {
        let next = source.next_kind();
        let mut state = Self {
            board,
            active: ActivePiece::spawn(next),
            next,
            source,
            score: 0,
            mode: GameMode::Playing,
            quit: false,
            last_fall_ms: 0,
            episode_id: 0,
            piece_id: 0,
            last_event: None,
        };
        state.spawn_piece();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> ActivePiece {
        self.active
    }

    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn game_over(&self) -> bool {
        self.mode == GameMode::GameOver
    }

    /// True once a quit was requested; ticks are then no-ops.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn last_fall_ms(&self) -> u64 {
        self.last_fall_ms
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    /// Row the active piece would land on after a hard drop.
    pub fn ghost_y(&self) -> i8 {
        self.active.ghost_y(&self.board)
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Run one update step at time `now_ms` with the actions received since the
    /// previous call, in arrival order.
    pub fn tick(&mut self, now_ms: u64, actions: &[GameAction]) -> TickReport {
        let mut report = TickReport::default();

        for &action in actions {
            if self.quit {
                break;
            }
            self.apply_action(action, now_ms);
        }

        if self.quit {
            report.quit = true;
            return report;
        }

        if self.mode != GameMode::Playing {
            return report;
        }

        if now_ms.saturating_sub(self.last_fall_ms) > DROP_INTERVAL_MS as u64 {
            if self.active.try_drop(&self.board) {
                report.fell = true;
            } else {
                report.lock = Some(self.lock_piece());
            }
            self.last_fall_ms = now_ms;
        }

        report
    }

    /// Apply one action immediately. Returns whether it changed anything;
    /// rejected or mode-inappropriate actions are silently ignored.
    pub fn apply_action(&mut self, action: GameAction, now_ms: u64) -> bool {
        if self.quit {
            return false;
        }

        match (self.mode, action) {
            (_, GameAction::Quit) => {
                self.quit = true;
                true
            }
            (GameMode::GameOver, GameAction::Restart) => {
                self.reset(now_ms);
                true
            }
            (GameMode::Playing, GameAction::MoveLeft) => self.active.try_shift(&self.board, -1),
            (GameMode::Playing, GameAction::MoveRight) => self.active.try_shift(&self.board, 1),
            (GameMode::Playing, GameAction::SoftDrop) => self.active.try_drop(&self.board),
            (GameMode::Playing, GameAction::Rotate) => self.active.try_rotate(&self.board),
            (GameMode::Playing, GameAction::HardDrop) => self.active.hard_drop(&self.board) > 0,
            _ => false,
        }
    }

    /// Commit the active piece into the board, clear full rows, score, and spawn
    /// the next piece. Ends the game if the new piece does not fit.
    pub fn lock_piece(&mut self) -> LockEvent {
        let piece = self.active;
        self.board.lock_cells(piece.cells(), piece.kind);

        let lines = self.board.clear_lines();
        let score_delta = line_clear_score(lines);
        self.score = self.score.saturating_add(score_delta);

        let event = LockEvent {
            kind: piece.kind,
            lines_cleared: lines as u32,
            score_delta,
        };
        self.last_event = Some(event);

        self.spawn_piece();
        event
    }

    /// Promote the queued kind to the active piece and queue a fresh one.
    /// Returns false (and enters GAME_OVER) if the spawn placement collides.
    pub fn spawn_piece(&mut self) -> bool {
        self.active = ActivePiece::spawn(self.next);
        self.next = self.source.next_kind();
        self.piece_id = self.piece_id.wrapping_add(1);

        if self.active.is_valid(&self.board) {
            true
        } else {
            self.mode = GameMode::GameOver;
            false
        }
    }

    /// Back to a fresh game: empty board, zero score, PLAYING, new pieces, and
    /// the fall timer restarted at `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.board.clear();
        self.score = 0;
        self.mode = GameMode::Playing;
        self.last_event = None;
        self.last_fall_ms = now_ms;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.piece_id = 0;
        self.next = self.source.next_kind();
        self.spawn_piece();
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);
        out.active = ActiveSnapshot::from(self.active);
        out.ghost_y = self.ghost_y();
        out.next = self.next;
        out.score = self.score;
        out.mode = self.mode;
        out.episode_id = self.episode_id;
        out.piece_id = self.piece_id;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedPieces;

    fn scripted(kinds: &[PieceKind]) -> GameState<ScriptedPieces> {
        GameState::with_source(ScriptedPieces::new(kinds))
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(12345);

        assert_eq!(state.mode(), GameMode::Playing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.episode_id(), 0);
        assert_eq!(state.piece_id(), 1);
        assert_eq!(state.board().filled_count(), 0);
        assert!(state.active().is_valid(state.board()));
        assert_eq!(state.active().y, 0);
    }

    #[test]
    fn next_kind_is_what_spawns_next() {
        let mut state = scripted(&[PieceKind::T, PieceKind::O, PieceKind::L]);
        assert_eq!(state.active().kind, PieceKind::T);
        assert_eq!(state.next_kind(), PieceKind::O);

        state.lock_piece();
        assert_eq!(state.active().kind, PieceKind::O);
        assert_eq!(state.next_kind(), PieceKind::L);
        assert_eq!(state.piece_id(), 2);
    }

    #[test]
    fn gravity_waits_for_strictly_more_than_the_interval() {
        let mut state = scripted(&[PieceKind::T]);

        let r = state.tick(DROP_INTERVAL_MS as u64, &[]);
        assert!(!r.fell);
        assert_eq!(state.active().y, 0);

        let r = state.tick(DROP_INTERVAL_MS as u64 + 1, &[]);
        assert!(r.fell);
        assert_eq!(state.active().y, 1);
        assert_eq!(state.last_fall_ms(), DROP_INTERVAL_MS as u64 + 1);

        // Timer restarted from the fall.
        let r = state.tick(2 * DROP_INTERVAL_MS as u64, &[]);
        assert!(!r.fell);
    }

    #[test]
    fn actions_apply_in_arrival_order() {
        let mut state = scripted(&[PieceKind::O]);
        let x0 = state.active().x;
        state.tick(
            16,
            &[
                GameAction::MoveLeft,
                GameAction::MoveLeft,
                GameAction::MoveRight,
            ],
        );
        assert_eq!(state.active().x, x0 - 1);
    }

    #[test]
    fn soft_drop_moves_one_row_without_locking() {
        let mut state = scripted(&[PieceKind::O]);
        assert!(state.apply_action(GameAction::SoftDrop, 0));
        assert_eq!(state.active().y, 1);
        assert_eq!(state.piece_id(), 1);
    }

    #[test]
    fn hard_drop_rests_but_locks_on_next_gravity_step() {
        let mut state = scripted(&[PieceKind::I, PieceKind::O]);
        state.tick(10, &[GameAction::HardDrop]);
        assert_eq!(state.active().y, 19);
        assert_eq!(state.board().filled_count(), 0);

        let r = state.tick(10 + DROP_INTERVAL_MS as u64 + 1, &[]);
        let lock = r.lock.expect("resting piece should lock");
        assert_eq!(lock.kind, PieceKind::I);
        assert_eq!(lock.lines_cleared, 0);
        assert_eq!(state.board().filled_count(), 4);
        assert_eq!(state.active().kind, PieceKind::O);
        assert_eq!(state.take_last_event(), Some(lock));
        assert_eq!(state.take_last_event(), None);
    }

    #[test]
    fn locking_completed_rows_scores_quadratically() {
        for (lines, expected) in [(1usize, 100u32), (2, 400), (3, 900), (4, 1600)] {
            // Fill the bottom `lines` rows except column 0, then drop a vertical I
            // into the gap.
            let rows: Vec<&str> = vec![".#########"; lines];
            let mut state = GameState::with_board(
                Board::from_rows(&rows),
                ScriptedPieces::new(&[PieceKind::I]),
            );
            state.apply_action(GameAction::Rotate, 0);
            for _ in 0..5 {
                state.apply_action(GameAction::MoveLeft, 0);
            }
            assert_eq!(state.active().x, 0);
            state.apply_action(GameAction::HardDrop, 0);

            let event = state.lock_piece();
            assert_eq!(event.lines_cleared as usize, lines, "{} lines", lines);
            assert_eq!(state.score(), expected);
            assert_eq!(event.score_delta, expected);
            // Remaining cells are the I's leftover above the cleared rows.
            assert_eq!(state.board().filled_count(), 4 - lines);
        }
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let mut state = scripted(&[PieceKind::O]);
        // Stack O pieces in the spawn columns until one no longer fits.
        for _ in 0..20 {
            if state.game_over() {
                break;
            }
            state.apply_action(GameAction::HardDrop, 0);
            state.lock_piece();
        }
        assert!(state.game_over());
        assert!(!state.active().is_valid(state.board()));
    }

    #[test]
    fn game_over_ignores_piece_actions_and_gravity() {
        let mut state = scripted(&[PieceKind::O]);
        while !state.game_over() {
            state.apply_action(GameAction::HardDrop, 0);
            state.lock_piece();
        }
        let before = state.active();
        let filled = state.board().filled_count();

        let r = state.tick(
            60_000,
            &[GameAction::MoveLeft, GameAction::Rotate, GameAction::HardDrop],
        );
        assert_eq!(r, TickReport::default());
        assert_eq!(state.active(), before);
        assert_eq!(state.board().filled_count(), filled);
    }

    #[test]
    fn restart_only_applies_after_game_over() {
        let mut state = scripted(&[PieceKind::O]);
        state.apply_action(GameAction::MoveLeft, 0);
        assert!(!state.apply_action(GameAction::Restart, 0));
        assert_eq!(state.episode_id(), 0);

        while !state.game_over() {
            state.apply_action(GameAction::HardDrop, 0);
            state.lock_piece();
        }
        assert!(state.apply_action(GameAction::Restart, 5_000));
        assert_eq!(state.mode(), GameMode::Playing);
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.last_fall_ms(), 5_000);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn quit_stops_processing() {
        let mut state = scripted(&[PieceKind::T]);
        let x0 = state.active().x;
        let r = state.tick(0, &[GameAction::Quit, GameAction::MoveLeft]);
        assert!(r.quit);
        assert!(state.quit_requested());
        assert_eq!(state.active().x, x0);

        let r = state.tick(10_000, &[]);
        assert!(r.quit);
        assert_eq!(state.active().y, 0);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut state = scripted(&[PieceKind::L, PieceKind::S]);
        state.apply_action(GameAction::Rotate, 0);
        let snap = state.snapshot();

        assert_eq!(snap.active.kind, PieceKind::L);
        assert_eq!(snap.active.rotation, Rotation::East);
        assert_eq!(snap.active.shape, state.active().shape());
        assert_eq!(snap.ghost_y, state.ghost_y());
        assert_eq!(snap.next, PieceKind::S);
        assert_eq!(snap.mode, GameMode::Playing);
        assert!(snap.board.iter().flatten().all(|&c| c == 0));
    }
}
