//! Adapter module - external control via TCP socket with a JSON protocol
//!
//! Lets another program play the game: it connects, sends actions, and
//! receives the session state as it changes.
//!
//! # Protocol Overview
//!
//! Line-delimited JSON over TCP (default `127.0.0.1:7777`):
//!
//! 1. **Handshake**: client sends `hello`, server answers `welcome` with the
//!    assigned role and the board size
//! 2. **Controller assignment**: the first client to say hello controls the
//!    game; later clients observe. When the controller leaves, the
//!    longest-connected handshaken client takes over
//! 3. **Commanding**: the controller sends `command` with up to 32 action names;
//!    the game loop applies them in order and replies with `ack`
//! 4. **Observation streaming**: streaming clients get an `observation`
//!    whenever the session state changes
//!
//! Protocol errors are answered with an `error` message carrying a stable
//! `code` (`bad_message`, `handshake_required`, `not_controller`,
//! `too_many_actions`, `backpressure`); the connection stays open.
//!
//! # Environment Variables
//!
//! - `BLOCKFALL_AI_HOST`: bind address (default: "127.0.0.1")
//! - `BLOCKFALL_AI_PORT`: port number (default: 7777)
//! - `BLOCKFALL_AI_MAX_PENDING`: queued commands before `backpressure` (default: 16)
//! - `BLOCKFALL_AI_DISABLED`: set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"}}
//! Server -> Client: {"type":"welcome","seq":1,"protocol_version":"1.0.0","role":"controller","board":{"width":10,"height":20}}
//! Server -> Client: {"type":"observation","seq":1,"mode":"playing","score":0,"board":[[0,...],...],...}
//! Client -> Server: {"type":"command","seq":2,"actions":["moveLeft","rotate","hardDrop"]}
//! Server -> Client: {"type":"ack","seq":2,"accepted":3,"ignored":0}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
