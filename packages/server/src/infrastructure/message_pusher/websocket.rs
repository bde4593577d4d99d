//! WebSocket を使った MessagePusher 実装
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された送信チャンネルを受け取り、JSON フレームの送信に使用します。
//!
//! - UI 層: WebSocket 接続の受付、チャンネルの生成、ソケットへの書き出し
//! - Infrastructure 層: チャンネルの管理、フレームの送信

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientId, MessagePushError, MessagePusher, PusherChannel};

#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信チャンネル
    clients: Mutex<HashMap<ClientId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, client_id: ClientId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", client_id);
        clients.insert(client_id, sender);
    }

    async fn unregister_client(&self, client_id: &ClientId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(client_id).is_some() {
            tracing::debug!("Client '{}' unregistered from MessagePusher", client_id);
        }
    }

    async fn push_to(&self, client_id: &ClientId, content: &str) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.as_str().to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::trace!("Pushed message to client '{}'", client_id);
        Ok(())
    }

    async fn broadcast(&self, targets: &[ClientId], content: &str) -> Vec<ClientId> {
        let clients = self.clients.lock().await;

        // 一部の送信失敗は許容し、残りのクライアントへの送信を続ける
        targets
            .iter()
            .filter(|target| match clients.get(*target) {
                Some(sender) => sender.send(content.to_string()).is_err(),
                None => {
                    tracing::debug!("Client '{}' not found during broadcast", target);
                    true
                }
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn cid(value: &str) -> ClientId {
        ClientId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のクライアントにメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(cid("alice"), tx).await;

        // when (操作):
        let result = pusher.push_to(&cid("alice"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&cid("nonexistent"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_push_to_closed_channel() {
        // テスト項目: 受信側が閉じたクライアントへの送信は PushFailed を返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(cid("alice"), tx).await;
        drop(rx);

        // when (操作):
        let result = pusher.push_to(&cid("alice"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_broadcast_reports_failed_targets() {
        // テスト項目: ブロードキャストは届かなかったクライアントだけを返し、他には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        pusher.register_client(cid("alice"), tx1).await;
        pusher.register_client(cid("bob"), tx2).await;
        drop(rx2);

        // when (操作):
        let failed = pusher
            .broadcast(&[cid("alice"), cid("bob"), cid("ghost")], "Broadcast")
            .await;

        // then (期待する結果):
        assert_eq!(failed, vec![cid("bob"), cid("ghost")]);
        assert_eq!(rx1.recv().await, Some("Broadcast".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでも失敗しない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let failed = pusher.broadcast(&[], "Message").await;

        // then (期待する結果):
        assert!(failed.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除したクライアントには送信できない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_client(cid("alice"), tx).await;

        // when (操作):
        pusher.unregister_client(&cid("alice")).await;
        let result = pusher.push_to(&cid("alice"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }
}
