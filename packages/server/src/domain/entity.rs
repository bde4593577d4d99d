//! Entities
//!
//! ショットパイプラインで扱うエンティティを定義します。
//!
//! - `HitRecord`: センサーから復号された着弾（不変）
//! - `ShotRecord`: セッションに割り当てられた着弾（追記のみ）
//! - `SessionState`: 訓練セッションの状態（Session Router が所有）
//! - `ClientConnection`: Broadcast Hub に接続中のクライアント（永続化しない）

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::value_object::{ClientId, FiringMode, Point, SessionId, Timestamp};

/// Opaque key/value metadata attached to a session at start time.
pub type SessionMetadata = BTreeMap<String, serde_json::Value>;

/// Metadata key that selects the firing mode when starting a session.
pub const FIRING_MODE_METADATA_KEY: &str = "firingMode";

/// Which wire format family produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFormat {
    /// Free text carrying the `Bullet Hit Coordinate (x, y)` annotation.
    LegacyBluetoothFrame,
    /// `x<sep>y[<sep>t]`
    DelimitedPair,
    /// Entered by an operator, not read from the sensor link.
    ManualEntry,
}

/// A decoded hit from the target grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitRecord {
    pub x: f64,
    pub y: f64,
    pub captured_at_millis: Timestamp,
    pub raw_text: String,
    pub source_format: SourceFormat,
}

impl HitRecord {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A hit as recorded in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotRecord {
    pub shot_number: u32,
    pub session_id: SessionId,
    #[serde(flatten)]
    pub hit: HitRecord,
}

impl ShotRecord {
    pub fn point(&self) -> Point {
        self.hit.point()
    }
}

/// Training session state, persisted as a JSON snapshot on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session_id: SessionId,
    pub started_at_millis: Timestamp,
    pub ended_at_millis: Option<Timestamp>,
    pub is_active: bool,
    pub firing_mode: FiringMode,
    pub shots: Vec<ShotRecord>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl SessionState {
    pub fn new(
        session_id: SessionId,
        firing_mode: FiringMode,
        metadata: SessionMetadata,
        started_at: Timestamp,
    ) -> Self {
        Self {
            session_id,
            started_at_millis: started_at,
            ended_at_millis: None,
            is_active: true,
            firing_mode,
            shots: Vec::new(),
            metadata,
        }
    }

    /// Whether hits from the live sensor grid should be appended.
    pub fn accepts_live_grid(&self) -> bool {
        self.is_active && self.firing_mode.is_live_grid()
    }

    /// Append a hit as the next shot, numbered `len(shots) + 1`.
    pub fn append_shot(&mut self, hit: HitRecord) -> ShotRecord {
        let shot = ShotRecord {
            shot_number: self.next_shot_number(),
            session_id: self.session_id.clone(),
            hit,
        };
        self.shots.push(shot.clone());
        shot
    }

    pub fn mark_stopped(&mut self, ended_at: Timestamp) {
        self.is_active = false;
        self.ended_at_millis = Some(ended_at);
    }

    fn next_shot_number(&self) -> u32 {
        u32::try_from(self.shots.len() + 1).unwrap_or(u32::MAX)
    }
}

/// A live hub client and its subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConnection {
    pub client_id: ClientId,
    pub connected_at_millis: Timestamp,
    pub subscribed_topics: BTreeSet<String>,
    pub session_id: Option<String>,
    pub lane_id: Option<String>,
}

impl ClientConnection {
    pub fn new(client_id: ClientId, connected_at: Timestamp) -> Self {
        Self {
            client_id,
            connected_at_millis: connected_at,
            subscribed_topics: BTreeSet::new(),
            session_id: None,
            lane_id: None,
        }
    }

    pub fn subscribe<I, S>(&mut self, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscribed_topics
            .extend(topics.into_iter().map(Into::into));
    }

    pub fn unsubscribe<I, S>(&mut self, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for topic in topics {
            self.subscribed_topics.remove(topic.as_ref());
        }
    }

    pub fn join(&mut self, session_id: Option<String>, lane_id: Option<String>) {
        self.session_id = session_id;
        self.lane_id = lane_id;
    }

    /// Leave the joined session.
    ///
    /// When `session_id` is given it must match the joined session, otherwise
    /// nothing changes. Returns whether membership was cleared.
    pub fn leave(&mut self, session_id: Option<&str>) -> bool {
        match (session_id, self.session_id.as_deref()) {
            (Some(requested), Some(joined)) if requested != joined => false,
            _ => {
                self.session_id = None;
                self.lane_id = None;
                true
            }
        }
    }

    pub fn is_subscribed_to(&self, topic: &str) -> bool {
        self.subscribed_topics.contains(topic)
    }

    pub fn is_in_session(&self, session_id: &str) -> bool {
        self.session_id.as_deref() == Some(session_id)
    }

    pub fn is_on_lane(&self, lane_id: &str) -> bool {
        self.lane_id.as_deref() == Some(lane_id)
    }
}

/// Events emitted by a sensor transport, consumed in order by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// The transport was (re)opened.
    Connected { source: String },
    /// One framed line, without the trailing newline.
    Frame(String),
    /// The transport was lost; the feed will retry on its own.
    Disconnected { source: String, reason: String },
}
