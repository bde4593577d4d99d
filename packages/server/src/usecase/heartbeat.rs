//! UseCase: ハートビート
//!
//! 一定間隔で全クライアントに `ping` を送信します。`pong` による切断判定は行いません。

use std::{sync::Arc, time::Duration};

use tokio::{sync::oneshot, task::JoinHandle, time::MissedTickBehavior};

use super::broadcast_hub::BroadcastHub;

pub struct Heartbeat {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Heartbeat {
    /// ハートビートタスクを起動（最初の ping は `period` 経過後）
    pub fn spawn(hub: Arc<BroadcastHub>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let delivered = hub.send_heartbeat().await;
                        tracing::debug!("Heartbeat sent to {} clients", delivered);
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });
        tracing::info!("Heartbeat started (every {:?})", period);
        Self { shutdown_tx, task }
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Heartbeat task failed: {}", e);
        }
        tracing::info!("Heartbeat stopped");
    }
}
