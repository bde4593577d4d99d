//! File SessionSnapshotStore 実装
//!
//! セッションごとに `<dir>/<session_id>.json` を 1 ファイル書き込みます。
//! 一時ファイルに書いてから rename するため、読み込み側が書きかけのファイルを見ることはありません。

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::domain::{SessionId, SessionSnapshotStore, SessionState, SnapshotStoreError};

const SNAPSHOT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// スナップショットディレクトリを開く（存在しなければ作成）
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, SnapshotStoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!("Snapshot directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // SessionId only admits [A-Za-z0-9_-], so it is safe as a file name.
    fn snapshot_path(&self, session_id: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", session_id.as_str(), SNAPSHOT_EXTENSION))
    }

    fn temp_path(&self, session_id: &SessionId) -> PathBuf {
        self.dir
            .join(format!(".{}.{}.tmp", session_id.as_str(), SNAPSHOT_EXTENSION))
    }
}

#[async_trait]
impl SessionSnapshotStore for FileSnapshotStore {
    async fn write(
        &self,
        session_id: &SessionId,
        snapshot: &SessionState,
    ) -> Result<(), SnapshotStoreError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let temp_path = self.temp_path(session_id);
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, self.snapshot_path(session_id)).await?;
        Ok(())
    }

    async fn read(&self, session_id: &SessionId) -> Result<Option<SessionState>, SnapshotStoreError> {
        match tokio::fs::read(self.snapshot_path(session_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
