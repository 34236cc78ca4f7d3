//! Protocol module - JSON message types for the control socket
//!
//! Every message is one JSON object per line with a `type` tag and a `seq`.
//! Replies echo the `seq` of the message they answer; observations carry the
//! host loop's own counter.

use serde::{Deserialize, Serialize};

use crate::core::GameSnapshot;
use crate::types::{GameAction, BOARD_HEIGHT, BOARD_WIDTH};

use arrayvec::ArrayVec;

/// Wire protocol version announced in `welcome`.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Most actions a single command may carry.
pub const MAX_ACTIONS_PER_COMMAND: usize = 32;

// ============== Client -> Game Messages ==============

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
    /// Whether the client wants observation broadcasts.
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    pub actions: ActionList,
}

/// Parsed action names of one command.
///
/// Unknown names are counted in `ignored` rather than rejected. Lists longer
/// than [`MAX_ACTIONS_PER_COMMAND`] are fully consumed but flagged `overflow`,
/// so the server can answer with a precise error code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList {
    pub actions: ArrayVec<GameAction, MAX_ACTIONS_PER_COMMAND>,
    pub ignored: u32,
    pub overflow: bool,
}

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = ActionList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of action names")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ActionList::default();
                let mut total = 0usize;
                while let Some(name) = seq.next_element::<String>()? {
                    total += 1;
                    if total > MAX_ACTIONS_PER_COMMAND {
                        out.overflow = true;
                        continue;
                    }
                    match GameAction::from_str(&name) {
                        Some(action) => out.actions.push(action),
                        None => out.ignored += 1,
                    }
                }
                Ok(out)
            }
        }

        deserializer.deserialize_seq(V)
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadMessage,
    HandshakeRequired,
    NotController,
    TooManyActions,
    Backpressure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadMessage => "bad_message",
            ErrorCode::HandshakeRequired => "handshake_required",
            ErrorCode::NotController => "not_controller",
            ErrorCode::TooManyActions => "too_many_actions",
            ErrorCode::Backpressure => "backpressure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDims {
    pub width: u8,
    pub height: u8,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub protocol_version: String,
    pub role: Role,
    pub board: BoardDims,
}

/// Sent once the game loop has applied a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub accepted: u32,
    pub ignored: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePieceView {
    pub kind: String,
    pub rotation: String,
    pub x: i8,
    pub y: i8,
    /// Current matrix rows, 1 = occupied.
    pub shape: Vec<Vec<u8>>,
}

/// Session state pushed to streaming clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub mode: String,
    pub score: u32,
    /// Rows top to bottom; 0 = empty, 1..=7 = I, O, T, S, Z, J, L.
    pub board: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: ActivePieceView,
    pub ghost_y: i8,
    pub next: String,
    pub episode_id: u32,
    pub piece_id: u32,
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
}

/// A line that could not be understood. `seq` is recovered when possible so
/// the error reply can still be correlated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub seq: u64,
    pub message: String,
}

/// Parse one inbound line.
pub fn parse_message(json: &str) -> Result<ParsedMessage, ParseFailure> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum InboundMessage {
        Hello(HelloMessage),
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct SeqOnly {
                seq: Option<u64>,
            }
            let seq = serde_json::from_str::<SeqOnly>(json)
                .ok()
                .and_then(|s| s.seq)
                .unwrap_or(0);
            Err(ParseFailure {
                seq,
                message: e.to_string(),
            })
        }
    }
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str) -> HelloMessage {
    HelloMessage {
        seq,
        client: Some(ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
        stream_observations: true,
    }
}

pub fn create_welcome(seq: u64, role: Role) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        protocol_version: PROTOCOL_VERSION.to_string(),
        role,
        board: BoardDims {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
        },
    }
}

pub fn create_ack(seq: u64, accepted: u32, ignored: u32) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        accepted,
        ignored,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        code,
        message: message.to_string(),
    }
}

/// Build an observation from a session snapshot.
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        mode: snap.mode.as_str().to_string(),
        score: snap.score,
        board: snap.board,
        active: ActivePieceView {
            kind: snap.active.kind.as_str().to_string(),
            rotation: snap.active.rotation.as_str().to_string(),
            x: snap.active.x,
            y: snap.active.y,
            shape: snap.active.shape.to_rows(),
        },
        ghost_y: snap.ghost_y,
        next: snap.next.as_str().to_string(),
        episode_id: snap.episode_id,
        piece_id: snap.piece_id,
    }
}
