//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of the falling-block game and the session
//! state machine. It has **no dependencies** on terminals or networking: hosts
//! feed it timestamps and actions and read snapshots back.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 locked-cell grid with two-phase line clearing
//! - [`shapes`]: the seven piece matrices and clockwise rotation
//! - [`piece`]: the falling piece and the single placement predicate
//! - [`rng`]: uniform piece source (seeded LCG) and scripted sources
//! - [`scoring`]: `100 * n²` line-clear points
//! - [`game_state`]: PLAYING / GAME_OVER session with the tick step
//! - [`snapshot`]: copyable view for renderers and observers
//! - [`clock`]: millisecond time sources for hosts
//!
//! # Game Rules
//!
//! - Pieces are drawn independently and uniformly; one upcoming kind is shown
//! - Rotation is a clockwise quarter turn with no wall kicks
//! - Gravity moves the piece one row every second; a piece that cannot fall locks
//! - Hard drop moves the piece to its landing row; it locks on the next gravity step
//! - The game ends when a freshly spawned piece does not fit
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_types::{GameAction, GameMode};
//!
//! let mut game = GameState::new(12345);
//!
//! game.tick(16, &[GameAction::MoveRight, GameAction::Rotate, GameAction::HardDrop]);
//! assert_eq!(game.active().y, game.ghost_y());
//!
//! // The resting piece locks once gravity next fires.
//! let report = game.tick(1_017, &[]);
//! assert!(report.lock.is_some());
//! assert_eq!(game.mode(), GameMode::Playing);
//! ```

pub mod board;
pub mod clock;
pub mod game_state;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod shapes;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use game_state::{GameState, TickReport};
pub use piece::{is_valid_placement, ActivePiece};
pub use rng::{PieceSource, ScriptedPieces, SimpleRng, UniformPieces};
pub use scoring::line_clear_score;
pub use shapes::{base_shape, color, get_shape, ShapeMatrix};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
