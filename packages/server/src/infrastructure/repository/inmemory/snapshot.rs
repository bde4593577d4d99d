//! InMemory SessionSnapshotStore 実装
//!
//! スナップショットを JSON 文字列として保持します。ファイルストアと同じく
//! シリアライズを経由するため、書き込んだ状態と読み出した状態の差異をテストで検出できます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{SessionId, SessionSnapshotStore, SessionState, SnapshotStoreError};

#[derive(Default)]
pub struct InMemorySnapshotStore {
    /// Key: session_id, Value: JSON スナップショット
    snapshots: Mutex<HashMap<SessionId, String>>,
    /// 書き込み回数（テスト用の観測値）
    writes: Mutex<usize>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに成功した書き込みの回数
    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl SessionSnapshotStore for InMemorySnapshotStore {
    async fn write(
        &self,
        session_id: &SessionId,
        snapshot: &SessionState,
    ) -> Result<(), SnapshotStoreError> {
        let json = serde_json::to_string(snapshot)?;
        self.snapshots.lock().await.insert(session_id.clone(), json);
        *self.writes.lock().await += 1;
        Ok(())
    }

    async fn read(&self, session_id: &SessionId) -> Result<Option<SessionState>, SnapshotStoreError> {
        let snapshots = self.snapshots.lock().await;
        snapshots
            .get(session_id)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(SnapshotStoreError::from)
    }
}
