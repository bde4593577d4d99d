//! Value objects
//!
//! 識別子やタイムスタンプなど、不変で値によって等価性が決まる型を定義します。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

const SESSION_ID_MAX_LEN: usize = 128;
const CLIENT_ID_MAX_LEN: usize = 128;

/// Training session identifier.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can double as a
/// snapshot file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::Empty("session id"));
        }
        if value.len() > SESSION_ID_MAX_LEN {
            return Err(ValueObjectError::TooLong {
                field: "session id",
                length: value.len(),
                max: SESSION_ID_MAX_LEN,
            });
        }
        if let Some(found) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValueObjectError::InvalidCharacter {
                field: "session id",
                found,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connected hub client identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty("client id"));
        }
        if value.len() > CLIENT_ID_MAX_LEN {
            return Err(ValueObjectError::TooLong {
                field: "client id",
                length: value.len(),
                max: CLIENT_ID_MAX_LEN,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(value: ClientId) -> Self {
        value.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates hub client ids: `client_<millis>_<random suffix>`.
pub struct ClientIdFactory;

impl ClientIdFactory {
    pub fn generate(now_millis: i64) -> ClientId {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        // 9 hex chars of randomness on top of the millisecond prefix
        ClientId(format!("client_{}_{}", now_millis, &suffix[..9]))
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Session firing mode, e.g. `live_grid` or `manual`.
///
/// Kept as an open string: the admin side may define modes this pipeline
/// knows nothing about, and only `live_grid` matters for routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiringMode(String);

impl FiringMode {
    /// Shots come from the infrared target grid.
    pub const LIVE_GRID: &'static str = "live_grid";
    /// Shots are entered by hand.
    pub const MANUAL: &'static str = "manual";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn live_grid() -> Self {
        Self(Self::LIVE_GRID.to_string())
    }

    pub fn manual() -> Self {
        Self(Self::MANUAL.to_string())
    }

    pub fn is_live_grid(&self) -> bool {
        self.0 == Self::LIVE_GRID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FiringMode {
    fn default() -> Self {
        Self::manual()
    }
}

/// A point on the target plane, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
