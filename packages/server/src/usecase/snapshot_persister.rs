//! UseCase: セッションスナップショットの永続化
//!
//! Session Router はスナップショットをチャンネルに渡すだけで、書き込みの完了を待ちません。
//! 単一のライタータスクがチャンネルを順番に処理してストアへ書き込みます。
//! 書き込み失敗はログに記録するだけで、リトライもロールバックもしません。

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{SessionSnapshotStore, SessionState};

enum PersistCommand {
    Write(Box<SessionState>),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Sending half handed to the Session Router.
#[derive(Clone)]
pub struct SnapshotSink {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl SnapshotSink {
    /// Queue a snapshot for writing. Never blocks.
    pub fn submit(&self, snapshot: SessionState) {
        let session_id = snapshot.session_id.clone();
        if self
            .tx
            .send(PersistCommand::Write(Box::new(snapshot)))
            .is_err()
        {
            tracing::warn!(
                "Snapshot persister is gone; snapshot for session '{}' dropped",
                session_id
            );
        }
    }
}

/// Owner of the background writer task.
pub struct SnapshotPersister {
    tx: mpsc::UnboundedSender<PersistCommand>,
    task: JoinHandle<()>,
}

impl SnapshotPersister {
    /// Spawn the writer task.
    pub fn spawn(store: Arc<dyn SessionSnapshotStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(writer_loop(store, rx));
        Self { tx, task }
    }

    pub fn sink(&self) -> SnapshotSink {
        SnapshotSink {
            tx: self.tx.clone(),
        }
    }

    /// Wait until every snapshot queued before this call has been handled.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Drain queued snapshots and stop the writer.
    pub async fn shutdown(self) {
        let _ = self.tx.send(PersistCommand::Shutdown);
        if let Err(e) = self.task.await {
            tracing::error!("Snapshot persister task failed: {}", e);
        }
        tracing::info!("Snapshot persister stopped");
    }
}

async fn writer_loop(
    store: Arc<dyn SessionSnapshotStore>,
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            PersistCommand::Write(snapshot) => {
                match store.write(&snapshot.session_id, &snapshot).await {
                    Ok(()) => tracing::debug!(
                        "Persisted snapshot for session '{}' ({} shots)",
                        snapshot.session_id,
                        snapshot.shots.len()
                    ),
                    Err(e) => tracing::warn!(
                        "Failed to persist snapshot for session '{}': {}",
                        snapshot.session_id,
                        e
                    ),
                }
            }
            PersistCommand::Flush(done) => {
                let _ = done.send(());
            }
            PersistCommand::Shutdown => break,
        }
    }
}
