//! Domain layer
//!
//! エンティティ、値オブジェクト、外部コラボレーターの trait、および
//! 副作用のないドメインロジック（ワイヤデコーダ、スコアリング）を定義します。

pub mod decoder;
pub mod entity;
pub mod error;
pub mod message;
pub mod message_pusher;
pub mod repository;
pub mod scoring;
pub mod value_object;

pub use decoder::WireDecoder;
pub use entity::{
    ClientConnection, FIRING_MODE_METADATA_KEY, HitRecord, SensorEvent, SessionMetadata,
    SessionState, ShotRecord, SourceFormat,
};
pub use error::{
    DecodeError, MessagePushError, ScoringError, SnapshotStoreError, ValueObjectError,
};
pub use message::{ClientMessage, ServerMessage};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{SessionMetadataLookup, SessionSnapshotStore};
pub use value_object::{ClientId, ClientIdFactory, FiringMode, Point, SessionId, Timestamp};
