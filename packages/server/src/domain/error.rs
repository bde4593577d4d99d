//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is too long ({length} > {max})")]
    TooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },

    #[error("{field} contains invalid character '{found}'")]
    InvalidCharacter { field: &'static str, found: char },
}

/// A sensor line that could not be turned into a hit record.
///
/// Decode failures are local to one line: the caller logs and discards it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty sensor line")]
    Empty,

    /// The capture marker was present but no valid `(x, y)` pair followed it.
    #[error("malformed capture frame: {0:?}")]
    MalformedCapture(String),

    #[error("unrecognized sensor line: {0:?}")]
    UnrecognizedFormat(String),
}

/// Scoring input errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("target diameter must be a positive finite number (got {0})")]
    InvalidTemplate(f64),

    #[error("engagement area must be a positive finite number (got {0})")]
    InvalidEngagementArea(f64),

    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),

    #[error("cannot compute statistics over an empty shot set")]
    EmptyShotSet,

    /// Inputs are valid on their own but the derived rings collapse or overflow
    #[error(
        "ring radii are not strictly ordered or not finite (inner {inner}, engagement {engagement}, outer {outer})"
    )]
    DegenerateRadii {
        inner: f64,
        engagement: f64,
        outer: f64,
    },
}

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum SnapshotStoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// MessagePusher errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// クライアントが見つからない
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    /// 送信失敗（受信側がすでに閉じている）
    #[error("push failed: {0}")]
    PushFailed(String),
}
