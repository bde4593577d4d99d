//! UseCase: ライブショットパイプライン
//!
//! センサーフレームを 1 行ずつ順番に処理します。
//! 各行について「デコード -> ルーティング -> 配信」を完了してから次の行に進むため、
//! ショット番号の採番に追加の同期は不要です。

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{DecodeError, SensorEvent, ShotRecord, WireDecoder};

use super::{broadcast_hub::BroadcastHub, session_router::SessionRouter};

pub struct LiveShotPipeline {
    decoder: WireDecoder,
    router: Arc<SessionRouter>,
    hub: Arc<BroadcastHub>,
}

impl LiveShotPipeline {
    pub fn new(decoder: WireDecoder, router: Arc<SessionRouter>, hub: Arc<BroadcastHub>) -> Self {
        Self {
            decoder,
            router,
            hub,
        }
    }

    /// 1 行を処理
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ShotRecord>)` - 追加されたショット（対象セッションがなければ空）
    /// * `Err(DecodeError)` - 行を復号できなかった（行は破棄される）
    pub async fn process_line(&self, line: &str) -> Result<Vec<ShotRecord>, DecodeError> {
        let hit = self.decoder.decode(line).inspect_err(|e| {
            tracing::warn!("Discarding sensor line: {}", e);
        })?;

        let shots = self.router.route_hit(&hit).await;
        if shots.is_empty() {
            tracing::debug!(
                "Hit ({}, {}) matched no active live-grid session",
                hit.x,
                hit.y
            );
            return Ok(shots);
        }

        for shot in &shots {
            let delivered = self.hub.send_ir_shot(shot).await;
            tracing::debug!(
                "Shot #{} of session '{}' delivered {} times",
                shot.shot_number,
                shot.session_id,
                delivered
            );
        }
        Ok(shots)
    }

    pub async fn handle_event(&self, event: SensorEvent) {
        match event {
            SensorEvent::Connected { source } => {
                tracing::info!("Sensor '{}' connected", source);
            }
            SensorEvent::Frame(line) => {
                // 復号失敗はログ済み
                let _ = self.process_line(&line).await;
            }
            SensorEvent::Disconnected { source, reason } => {
                tracing::warn!("Sensor '{}' disconnected: {}", source, reason);
            }
        }
    }

    /// イベントチャンネルを消費するタスクを起動
    ///
    /// 送信側がすべて閉じるか `shutdown` が呼ばれると終了します。
    pub fn spawn(self: Arc<Self>, mut events: mpsc::Receiver<SensorEvent>) -> PipelineHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    event = events.recv() => match event {
                        Some(event) => self.handle_event(event).await,
                        None => break,
                    },
                }
            }
            tracing::info!("Live shot pipeline stopped");
        });
        PipelineHandle { shutdown_tx, task }
    }
}

pub struct PipelineHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PipelineHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Live shot pipeline task failed: {}", e);
        }
    }
}
