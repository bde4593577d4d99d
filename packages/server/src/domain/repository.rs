//! Collaborator traits
//!
//! パイプラインが外部に求めるデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::SessionState,
    error::SnapshotStoreError,
    value_object::{FiringMode, SessionId},
};

/// Session snapshot store
///
/// Session Router はセッションが変化するたびに JSON スナップショットを書き込みます。
/// 書き込みは fire-and-forget で、失敗してもメモリ上の状態は巻き戻しません。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionSnapshotStore: Send + Sync {
    /// スナップショットを書き込む（同じ session_id は上書き）
    async fn write(
        &self,
        session_id: &SessionId,
        snapshot: &SessionState,
    ) -> Result<(), SnapshotStoreError>;

    /// スナップショットを読み込む（存在しなければ `None`）
    async fn read(&self, session_id: &SessionId) -> Result<Option<SessionState>, SnapshotStoreError>;
}

/// Session metadata lookup
///
/// セッション開始時に firing mode を決定するために参照します。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionMetadataLookup: Send + Sync {
    /// 登録済みの firing mode を返す（未登録なら `None`）
    async fn firing_mode(&self, session_id: &SessionId) -> Option<FiringMode>;
}
