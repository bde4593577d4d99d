//! UseCase: ブロードキャストハブ
//!
//! 接続中のクライアントと、その購読トピック・参加セッション・レーンを管理し、
//! イベントを該当するクライアントにだけ配信します。
//!
//! - 送信失敗したクライアントはその場で登録解除する（再送なし）
//! - 未知のメッセージはログに記録して無視する（接続は維持、返信なし）
//! - デコーダやルーターには依存しない

use std::{collections::HashMap, sync::Arc};

use rangeline_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ClientConnection, ClientId, ClientIdFactory, ClientMessage, MessagePusher, PusherChannel,
    ServerMessage, SessionState, ShotRecord, Timestamp,
    message::{IR_SHOT_TOPIC, SESSIONS_TOPIC},
};

/// Session lifecycle event kinds relayed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventKind {
    Started,
    Stopped,
}

pub struct BroadcastHub {
    /// 接続中のクライアント（Key: client_id）
    connections: Mutex<HashMap<ClientId, ClientConnection>>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl BroadcastHub {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            message_pusher,
            clock,
        }
    }

    /// クライアントを登録し、`connected` を送信
    ///
    /// # Returns
    ///
    /// 割り当てたクライアント ID（`client_<millis>_<random>`）
    pub async fn register(&self, sender: PusherChannel) -> ClientId {
        let now = self.clock.now_millis();
        let client_id = ClientIdFactory::generate(now);

        self.message_pusher
            .register_client(client_id.clone(), sender)
            .await;
        {
            let mut connections = self.connections.lock().await;
            connections.insert(
                client_id.clone(),
                ClientConnection::new(client_id.clone(), Timestamp::new(now)),
            );
        }
        tracing::info!("Client '{}' connected", client_id);

        self.send(
            &client_id,
            &ServerMessage::Connected {
                client_id: client_id.as_str().to_string(),
            },
        )
        .await;
        client_id
    }

    /// クライアントの登録を解除（存在しない場合は何もしない）
    pub async fn unregister(&self, client_id: &ClientId) {
        let removed = {
            let mut connections = self.connections.lock().await;
            connections.remove(client_id).is_some()
        };
        self.message_pusher.unregister_client(client_id).await;
        if removed {
            tracing::info!("Client '{}' disconnected", client_id);
        }
    }

    /// クライアントから受信したテキストフレームを処理
    pub async fn handle_client_message(&self, client_id: &ClientId, text: &str) {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unrecognized message from client '{}': {} ({})",
                    client_id,
                    text,
                    e
                );
                return;
            }
        };

        let reply = {
            let mut connections = self.connections.lock().await;
            let Some(connection) = connections.get_mut(client_id) else {
                tracing::debug!("Message from unknown client '{}' ignored", client_id);
                return;
            };
            apply_client_message(connection, message, self.clock.now_millis())
        };

        if let Some(reply) = reply {
            self.send(client_id, &reply).await;
        }
    }

    /// 特定のクライアントに送信
    ///
    /// 送信に失敗した場合はクライアントを登録解除し `false` を返します。
    pub async fn send(&self, client_id: &ClientId, message: &ServerMessage) -> bool {
        let Some(json) = encode(message) else {
            return false;
        };
        match self.message_pusher.push_to(client_id, &json).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to deliver '{}' to client '{}': {}",
                    message.kind(),
                    client_id,
                    e
                );
                self.unregister(client_id).await;
                false
            }
        }
    }

    /// 条件に一致するすべてのクライアントに送信
    ///
    /// # Returns
    ///
    /// 配信に成功したクライアント数
    pub async fn broadcast<F>(&self, message: &ServerMessage, predicate: F) -> usize
    where
        F: Fn(&ClientConnection) -> bool,
    {
        let targets: Vec<ClientId> = {
            let connections = self.connections.lock().await;
            connections
                .values()
                .filter(|connection| predicate(connection))
                .map(|connection| connection.client_id.clone())
                .collect()
        };
        if targets.is_empty() {
            return 0;
        }
        let Some(json) = encode(message) else {
            return 0;
        };

        let failed = self.message_pusher.broadcast(&targets, &json).await;
        for client_id in &failed {
            tracing::warn!(
                "Dropping client '{}' after failed '{}' delivery",
                client_id,
                message.kind()
            );
            self.unregister(client_id).await;
        }
        targets.len().saturating_sub(failed.len())
    }

    pub async fn broadcast_all(&self, message: &ServerMessage) -> usize {
        self.broadcast(message, |_| true).await
    }

    pub async fn broadcast_to_topic(&self, topic: &str, message: &ServerMessage) -> usize {
        self.broadcast(message, |c| c.is_subscribed_to(topic)).await
    }

    pub async fn broadcast_to_session(&self, session_id: &str, message: &ServerMessage) -> usize {
        self.broadcast(message, |c| c.is_in_session(session_id))
            .await
    }

    pub async fn broadcast_to_lane(&self, lane_id: &str, message: &ServerMessage) -> usize {
        self.broadcast(message, |c| c.is_on_lane(lane_id)).await
    }

    /// ライブショットを配信
    ///
    /// セッション参加者に送った後、`irShot` トピックの購読者にも送ります。
    /// 両方に該当するクライアントは 2 回受信します。
    pub async fn send_ir_shot(&self, shot: &ShotRecord) -> usize {
        let session_id = shot.session_id.as_str();
        let message = ServerMessage::IrShot {
            session_id: session_id.to_string(),
            shot: shot.clone(),
            timestamp: self.clock.now_millis(),
        };
        let to_session = self.broadcast_to_session(session_id, &message).await;
        let to_topic = self.broadcast_to_topic(IR_SHOT_TOPIC, &message).await;
        to_session + to_topic
    }

    /// セッションの開始・停止を配信（セッション参加者と `sessions` トピック）
    pub async fn send_session_event(&self, kind: SessionEventKind, session: &SessionState) -> usize {
        let session_id = session.session_id.as_str().to_string();
        let timestamp = self.clock.now_millis();
        let message = match kind {
            SessionEventKind::Started => ServerMessage::SessionStarted {
                session_id: session_id.clone(),
                session: session.clone(),
                timestamp,
            },
            SessionEventKind::Stopped => ServerMessage::SessionStopped {
                session_id: session_id.clone(),
                session: session.clone(),
                timestamp,
            },
        };
        let to_session = self.broadcast_to_session(&session_id, &message).await;
        let to_topic = self.broadcast_to_topic(SESSIONS_TOPIC, &message).await;
        to_session + to_topic
    }

    /// 全クライアントに `ping` を送信
    pub async fn send_heartbeat(&self) -> usize {
        let message = ServerMessage::Ping {
            timestamp: self.clock.now_millis(),
        };
        self.broadcast_all(&message).await
    }

    pub async fn client_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// 接続中のクライアント（接続時刻順）
    pub async fn connections(&self) -> Vec<ClientConnection> {
        let connections = self.connections.lock().await;
        let mut list: Vec<ClientConnection> = connections.values().cloned().collect();
        list.sort_by(|a, b| {
            a.connected_at_millis
                .cmp(&b.connected_at_millis)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        list
    }
}

/// 接続状態を更新し、返信メッセージを返す
fn apply_client_message(
    connection: &mut ClientConnection,
    message: ClientMessage,
    now_millis: i64,
) -> Option<ServerMessage> {
    match message {
        ClientMessage::Subscribe { events } => {
            connection.subscribe(events.iter().cloned());
            tracing::debug!("Client '{}' subscribed to {:?}", connection.client_id, events);
            Some(ServerMessage::Subscribed { events })
        }
        ClientMessage::Unsubscribe { events } => {
            connection.unsubscribe(&events);
            tracing::debug!(
                "Client '{}' unsubscribed from {:?}",
                connection.client_id,
                events
            );
            Some(ServerMessage::Unsubscribed { events })
        }
        ClientMessage::JoinSession {
            session_id,
            lane_id,
        } => {
            connection.join(session_id.clone(), lane_id.clone());
            tracing::debug!(
                "Client '{}' joined session {:?} lane {:?}",
                connection.client_id,
                session_id,
                lane_id
            );
            Some(ServerMessage::SessionJoined {
                session_id,
                lane_id,
            })
        }
        ClientMessage::LeaveSession { session_id, .. } => {
            let held_session = connection.session_id.clone();
            let held_lane = connection.lane_id.clone();
            if !connection.leave(session_id.as_deref()) {
                tracing::warn!(
                    "Client '{}' asked to leave {:?} but is in {:?}; membership kept",
                    connection.client_id,
                    session_id,
                    held_session
                );
                return None;
            }
            tracing::debug!(
                "Client '{}' left session {:?} lane {:?}",
                connection.client_id,
                held_session,
                held_lane
            );
            Some(ServerMessage::SessionLeft {
                session_id: held_session,
                lane_id: held_lane,
            })
        }
        ClientMessage::Ping => Some(ServerMessage::Pong {
            timestamp: now_millis,
        }),
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    serde_json::to_string(message)
        .inspect_err(|e| tracing::error!("Failed to serialize '{}': {}", message.kind(), e))
        .ok()
}
