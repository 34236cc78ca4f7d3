//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. Each key press
//! yields at most one discrete action; there is no auto-repeat handling beyond
//! what the terminal itself sends.

pub mod map;

pub use blockfall_types as types;

pub use map::{handle_key_event, is_actionable, map_key, should_quit};
