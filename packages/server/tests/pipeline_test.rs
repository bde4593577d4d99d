//! End-to-end tests: sensor lines in, WebSocket frames and HTTP answers out.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use rangeline_server::{
    domain::{SessionSnapshotStore, WireDecoder, scoring::ScoringConfig},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{FileSnapshotStore, StaticMetadataLookup},
    },
    ui::{AppState, router},
    usecase::{
        BroadcastHub, LiveShotPipeline, SessionRouter, SessionStatisticsUseCase, SnapshotPersister,
    },
};
use rangeline_shared::time::{Clock, SystemClock};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    pipeline: Arc<LiveShotPipeline>,
    persister: SnapshotPersister,
    snapshot_dir: TempDir,
    http: reqwest::Client,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let snapshot_dir = TempDir::new().unwrap();
        let store: Arc<dyn SessionSnapshotStore> =
            Arc::new(FileSnapshotStore::open(snapshot_dir.path()).await.unwrap());
        let persister = SnapshotPersister::spawn(store.clone());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let session_router = Arc::new(SessionRouter::new(
            persister.sink(),
            store,
            Arc::new(StaticMetadataLookup::new()),
            clock.clone(),
        ));
        let hub = Arc::new(BroadcastHub::new(
            Arc::new(WebSocketMessagePusher::new()),
            clock.clone(),
        ));
        let statistics = Arc::new(SessionStatisticsUseCase::new(
            session_router.clone(),
            ScoringConfig::default(),
        ));
        let pipeline = Arc::new(LiveShotPipeline::new(
            WireDecoder::new(clock),
            session_router.clone(),
            hub.clone(),
        ));
        let state = Arc::new(AppState::new(session_router, hub, statistics));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            addr,
            pipeline,
            persister,
            snapshot_dir,
            http: reqwest::Client::new(),
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self) -> (WsClient, String) {
        let (mut ws, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .unwrap();
        let connected = next_json(&mut ws).await;
        assert_eq!(connected["type"], "connected");
        let client_id = connected["clientId"].as_str().unwrap().to_string();
        (ws, client_id)
    }

    async fn start_live_session(&self, session_id: &str) {
        let response = self
            .http
            .post(self.url(&format!("/api/sessions/{}/start", session_id)))
            .json(&json!({"firingMode": "live_grid", "lane": 2}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn next_json(ws: &mut WsClient) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for a frame")
        .unwrap()
        .unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_live_hit_reaches_session_audience_and_topic_subscribers() {
    // テスト項目: センサー行が復号・ルーティングされ、セッション参加者と irShot 購読者に配信される
    // given (前提条件):
    let server = TestServer::start().await;
    server.start_live_session("LIVE1").await;

    let (mut member, _) = server.connect().await;
    send_json(
        &mut member,
        json!({"type": "joinSession", "sessionId": "LIVE1", "laneId": "2"}),
    )
    .await;
    assert_eq!(next_json(&mut member).await["type"], "sessionJoined");

    let (mut watcher, _) = server.connect().await;
    send_json(&mut watcher, json!({"type": "subscribe", "events": ["irShot"]})).await;
    assert_eq!(next_json(&mut watcher).await["type"], "subscribed");

    // when (操作):
    let shots = server
        .pipeline
        .process_line("Bullet Hit Coordinate (205, 195)\r\n")
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(shots.len(), 1);
    for ws in [&mut member, &mut watcher] {
        let msg = next_json(ws).await;
        assert_eq!(msg["type"], "irShot");
        assert_eq!(msg["sessionId"], "LIVE1");
        assert_eq!(msg["shot"]["shotNumber"], 1);
        assert_eq!(msg["shot"]["x"], 205.0);
        assert_eq!(msg["shot"]["sourceFormat"], "legacyBluetoothFrame");
    }
}

#[tokio::test]
async fn test_session_lifecycle_over_http() {
    // テスト項目: HTTP で開始・ショット記録・統計・停止ができ、スナップショットがディスクに残る
    // given (前提条件):
    let server = TestServer::start().await;
    server.start_live_session("S1").await;
    for line in ["200,200", "not a hit", "210:210:1700000000000", "190|190"] {
        let _ = server.pipeline.process_line(line).await;
    }

    // when (操作):
    let duplicate = server
        .http
        .post(server.url("/api/sessions/S1/start"))
        .send()
        .await
        .unwrap();
    let statistics: Value = server
        .http
        .get(server.url(
            "/api/sessions/S1/statistics?diameter=120&engagementArea=30&bullseyeX=200&bullseyeY=200&kind=test",
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stopped = server
        .http
        .post(server.url("/api/sessions/S1/stop"))
        .send()
        .await
        .unwrap();
    let stopped_status = stopped.status();
    let stopped: Value = stopped.json().await.unwrap();
    let manual_after_stop = server
        .http
        .post(server.url("/api/sessions/S1/shots"))
        .json(&json!({"x": 1.0, "y": 1.0}))
        .send()
        .await
        .unwrap();
    server.persister.flush().await;

    // then (期待する結果):
    assert_eq!(duplicate.status(), reqwest::StatusCode::CONFLICT);

    assert_eq!(statistics["statistics"]["shotCount"], 3);
    assert_eq!(statistics["statistics"]["mpiDistance"], 0.0);
    assert_eq!(statistics["radii"]["innerRadius"], 15.0);
    assert_eq!(statistics["radii"]["outerBullseyeRadius"], 45.0);
    assert_eq!(statistics["rating"], "Excellent");

    assert_eq!(stopped_status, reqwest::StatusCode::OK);
    assert_eq!(stopped["isActive"], false);
    assert_eq!(stopped["shots"].as_array().unwrap().len(), 3);
    assert_eq!(stopped["shots"][1]["capturedAtMillis"], 1_700_000_000_000_i64);
    assert_eq!(stopped["metadata"]["lane"], 2);

    assert_eq!(manual_after_stop.status(), reqwest::StatusCode::CONFLICT);

    let snapshot: Value =
        serde_json::from_slice(&std::fs::read(server.snapshot_dir.path().join("S1.json")).unwrap())
            .unwrap();
    assert_eq!(snapshot["isActive"], false);
    assert_eq!(snapshot["shots"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_http_errors_and_clients_listing() {
    // テスト項目: 不正な入力・存在しないセッションに対するステータスと、接続中クライアントの一覧
    // given (前提条件):
    let server = TestServer::start().await;
    let (_ws, client_id) = server.connect().await;

    // when (操作):
    let health: Value = server
        .http
        .get(server.url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = server
        .http
        .get(server.url("/api/sessions/NOPE"))
        .send()
        .await
        .unwrap();
    let invalid_id = server
        .http
        .post(server.url("/api/sessions/bad%20id/start"))
        .send()
        .await
        .unwrap();
    let bad_metadata = server
        .http
        .post(server.url("/api/sessions/S2/start"))
        .body("[1, 2]")
        .send()
        .await
        .unwrap();
    let clients: Value = server
        .http
        .get(server.url("/api/clients"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sessions: Value = server
        .http
        .get(server.url("/api/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(invalid_id.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(bad_metadata.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(clients.as_array().unwrap().len(), 1);
    assert_eq!(clients[0]["clientId"], client_id.as_str());
    assert_eq!(sessions, json!([]));
}

#[tokio::test]
async fn test_unknown_client_message_keeps_connection() {
    // テスト項目: 未知のメッセージを送っても接続は維持され、ping に pong が返る
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut ws, _) = server.connect().await;

    // when (操作):
    send_json(&mut ws, json!({"type": "selfDestruct"})).await;
    send_json(&mut ws, json!({"type": "ping"})).await;

    // then (期待する結果):
    let pong = next_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
    assert!(pong["timestamp"].as_i64().unwrap() > 0);
}
