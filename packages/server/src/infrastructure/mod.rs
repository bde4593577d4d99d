//! Infrastructure layer
//!
//! ドメイン層の trait の具体的な実装と、外部とのデータ変換を提供します。
//!
//! - `dto`: HTTP API の入出力
//! - `message_pusher`: WebSocket クライアントへの送信
//! - `repository`: スナップショットストア、メタデータ参照
//! - `sensor`: センサー入力

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod sensor;
