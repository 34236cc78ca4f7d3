//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: views draw into a plain framebuffer,
//! and the renderer flushes it to the terminal, sending only what changed.
//! There are no widgets or layout engine; each playfield cell is two columns
//! wide to keep blocks roughly square.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, FrameRect, GameView, Viewport};
pub use renderer::{changed_runs, encode_diff_into, encode_full_into, Run, TerminalRenderer};
