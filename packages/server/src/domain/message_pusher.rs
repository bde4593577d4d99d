//! MessagePusher trait 定義
//!
//! Broadcast Hub がクライアントへ送信するためのインターフェースです。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ClientId};

/// Outbound channel of one client connection (serialized JSON frames).
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, client_id: ClientId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除
    async fn unregister_client(&self, client_id: &ClientId);

    /// 特定のクライアントに送信
    async fn push_to(&self, client_id: &ClientId, content: &str) -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信
    ///
    /// 一部の送信失敗は許容し、失敗したクライアント ID を返します。
    async fn broadcast(&self, targets: &[ClientId], content: &str) -> Vec<ClientId>;
}
