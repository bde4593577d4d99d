//! Broadcast hub protocol.
//!
//! One JSON object per WebSocket text frame, discriminated by `type`.

use serde::{Deserialize, Serialize};

use super::entity::{SessionState, ShotRecord};

/// Global topic carrying every live shot.
pub const IR_SHOT_TOPIC: &str = "irShot";

/// Global topic carrying session start/stop events.
pub const SESSIONS_TOPIC: &str = "sessions";

/// Client -> server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Subscribe {
        #[serde(default)]
        events: Vec<String>,
    },
    Unsubscribe {
        #[serde(default)]
        events: Vec<String>,
    },
    JoinSession {
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        lane_id: Option<String>,
    },
    LeaveSession {
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        lane_id: Option<String>,
    },
    Ping,
}

/// Server -> client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Connected {
        client_id: String,
    },
    Subscribed {
        events: Vec<String>,
    },
    Unsubscribed {
        events: Vec<String>,
    },
    SessionJoined {
        session_id: Option<String>,
        lane_id: Option<String>,
    },
    SessionLeft {
        session_id: Option<String>,
        lane_id: Option<String>,
    },
    IrShot {
        session_id: String,
        shot: ShotRecord,
        timestamp: i64,
    },
    SessionStarted {
        session_id: String,
        session: SessionState,
        timestamp: i64,
    },
    SessionStopped {
        session_id: String,
        session: SessionState,
        timestamp: i64,
    },
    Ping {
        timestamp: i64,
    },
    Pong {
        timestamp: i64,
    },
}

impl ServerMessage {
    /// Wire name of the message (`type` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Subscribed { .. } => "subscribed",
            Self::Unsubscribed { .. } => "unsubscribed",
            Self::SessionJoined { .. } => "sessionJoined",
            Self::SessionLeft { .. } => "sessionLeft",
            Self::IrShot { .. } => "irShot",
            Self::SessionStarted { .. } => "sessionStarted",
            Self::SessionStopped { .. } => "sessionStopped",
            Self::Ping { .. } => "ping",
            Self::Pong { .. } => "pong",
        }
    }
}
