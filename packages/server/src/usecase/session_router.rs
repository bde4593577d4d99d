//! UseCase: セッションルーター
//!
//! 追跡中のセッション表を所有し、復号された着弾をライブグリッド入力を受け付ける
//! すべてのアクティブなセッションへ振り分けます。
//!
//! - 1 つの着弾は 0 個、1 個、または複数のセッションに追加される
//! - ショット番号はセッションごとに 1 から欠番なく増加する
//! - 変更のたびにスナップショットを永続化する（完了は待たない）
//! - 停止したセッションはメモリから削除しない（追い出しポリシーなし）

use std::{collections::BTreeMap, sync::Arc};

use rangeline_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    FIRING_MODE_METADATA_KEY, FiringMode, HitRecord, Point, SessionId, SessionMetadata,
    SessionMetadataLookup, SessionSnapshotStore, SessionState, ShotRecord, SourceFormat,
    Timestamp,
};

use super::{error::SessionError, snapshot_persister::SnapshotSink};

/// Owner of the in-memory session table.
pub struct SessionRouter {
    /// セッション表（ID 順）
    sessions: Mutex<BTreeMap<SessionId, SessionState>>,
    /// スナップショットの書き込み先（fire-and-forget）
    snapshot_sink: SnapshotSink,
    /// スナップショットの読み込み元（restore 用）
    snapshot_store: Arc<dyn SessionSnapshotStore>,
    /// firing mode の参照先
    metadata_lookup: Arc<dyn SessionMetadataLookup>,
    clock: Arc<dyn Clock>,
}

impl SessionRouter {
    pub fn new(
        snapshot_sink: SnapshotSink,
        snapshot_store: Arc<dyn SessionSnapshotStore>,
        metadata_lookup: Arc<dyn SessionMetadataLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: Mutex::new(BTreeMap::new()),
            snapshot_sink,
            snapshot_store,
            metadata_lookup,
            clock,
        }
    }

    /// セッションを開始
    ///
    /// firing mode は `metadata["firingMode"]`、メタデータ参照、`manual` の順で決定します。
    /// 停止済みの同じ ID は新しい状態で置き換えます。
    ///
    /// # Returns
    ///
    /// * `Ok(SessionState)` - 開始したセッションの状態
    /// * `Err(SessionError::AlreadyActive)` - すでにアクティブ
    pub async fn start_session(
        &self,
        session_id: SessionId,
        metadata: SessionMetadata,
    ) -> Result<SessionState, SessionError> {
        self.ensure_not_active(&session_id).await?;

        let firing_mode = self.resolve_firing_mode(&session_id, &metadata).await;

        let state = {
            let mut sessions = self.sessions.lock().await;
            // The lookup above may have yielded; re-check under the lock.
            if sessions.get(&session_id).is_some_and(|s| s.is_active) {
                return Err(SessionError::AlreadyActive(session_id.into_string()));
            }
            let state = SessionState::new(
                session_id.clone(),
                firing_mode,
                metadata,
                Timestamp::new(self.clock.now_millis()),
            );
            sessions.insert(session_id, state.clone());
            state
        };

        tracing::info!(
            "Session '{}' started (firing mode: {})",
            state.session_id,
            state.firing_mode.as_str()
        );
        self.snapshot_sink.submit(state.clone());
        Ok(state)
    }

    /// セッションを停止
    ///
    /// すでに停止済みの場合は状態を変えずにそのまま返します。
    pub async fn stop_session(&self, session_id: &SessionId) -> Result<SessionState, SessionError> {
        let (state, _) = self.stop_session_tracked(session_id).await?;
        Ok(state)
    }

    /// セッションを停止し、この呼び出しで状態が変わったかどうかも返す
    ///
    /// 判定は停止と同じロック内で行うため、同時に停止しても `true` になるのは 1 回だけです。
    pub async fn stop_session_tracked(
        &self,
        session_id: &SessionId,
    ) -> Result<(SessionState, bool), SessionError> {
        let state = {
            let mut sessions = self.sessions.lock().await;
            let state = sessions
                .get_mut(session_id)
                .ok_or_else(|| SessionError::NotFound(session_id.as_str().to_string()))?;
            if !state.is_active {
                return Ok((state.clone(), false));
            }
            state.mark_stopped(Timestamp::new(self.clock.now_millis()));
            state.clone()
        };

        tracing::info!(
            "Session '{}' stopped with {} shots",
            state.session_id,
            state.shots.len()
        );
        self.snapshot_sink.submit(state.clone());
        Ok((state, true))
    }

    /// 着弾をライブグリッド入力を受け付けるすべてのセッションに追加
    ///
    /// # Returns
    ///
    /// 追加されたショット（セッション ID 順）。どのセッションにも該当しなければ空。
    pub async fn route_hit(&self, hit: &HitRecord) -> Vec<ShotRecord> {
        let routed: Vec<(ShotRecord, SessionState)> = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .values_mut()
                .filter(|state| state.accepts_live_grid())
                .map(|state| {
                    let shot = state.append_shot(hit.clone());
                    (shot, state.clone())
                })
                .collect()
        };

        routed
            .into_iter()
            .map(|(shot, snapshot)| {
                tracing::debug!(
                    "Routed hit ({}, {}) to session '{}' as shot #{}",
                    shot.hit.x,
                    shot.hit.y,
                    shot.session_id,
                    shot.shot_number
                );
                self.snapshot_sink.submit(snapshot);
                shot
            })
            .collect()
    }

    /// 手入力のショットを追加（firing mode に関係なく、アクティブなセッションのみ）
    pub async fn record_manual_shot(
        &self,
        session_id: &SessionId,
        point: Point,
    ) -> Result<ShotRecord, SessionError> {
        let now = self.clock.now_millis();
        let (shot, snapshot) = {
            let mut sessions = self.sessions.lock().await;
            let state = sessions
                .get_mut(session_id)
                .ok_or_else(|| SessionError::NotFound(session_id.as_str().to_string()))?;
            if !state.is_active {
                return Err(SessionError::NotActive(session_id.as_str().to_string()));
            }
            let shot = state.append_shot(HitRecord {
                x: point.x,
                y: point.y,
                captured_at_millis: Timestamp::new(now),
                raw_text: String::new(),
                source_format: SourceFormat::ManualEntry,
            });
            (shot, state.clone())
        };

        tracing::info!(
            "Manual shot #{} recorded for session '{}'",
            shot.shot_number,
            shot.session_id
        );
        self.snapshot_sink.submit(snapshot);
        Ok(shot)
    }

    pub async fn get_session(&self, session_id: &SessionId) -> Result<SessionState, SessionError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.as_str().to_string()))
    }

    /// 追跡中のすべてのセッション（停止済みを含む、ID 順）
    pub async fn list_sessions(&self) -> Vec<SessionState> {
        let sessions = self.sessions.lock().await;
        sessions.values().cloned().collect()
    }

    /// スナップショットストアからセッションを読み込む
    ///
    /// メモリ上にすでに存在する場合はメモリ上の状態を優先して返します。
    pub async fn restore_session(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionState, SessionError> {
        if let Ok(state) = self.get_session(session_id).await {
            return Ok(state);
        }

        let snapshot = self
            .snapshot_store
            .read(session_id)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?
            .ok_or_else(|| SessionError::NotFound(session_id.as_str().to_string()))?;

        let mut sessions = self.sessions.lock().await;
        let state = sessions
            .entry(session_id.clone())
            .or_insert(snapshot)
            .clone();
        tracing::info!(
            "Session '{}' restored from snapshot ({} shots, active: {})",
            state.session_id,
            state.shots.len(),
            state.is_active
        );
        Ok(state)
    }

    async fn ensure_not_active(&self, session_id: &SessionId) -> Result<(), SessionError> {
        let sessions = self.sessions.lock().await;
        match sessions.get(session_id) {
            Some(state) if state.is_active => {
                Err(SessionError::AlreadyActive(session_id.as_str().to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn resolve_firing_mode(
        &self,
        session_id: &SessionId,
        metadata: &SessionMetadata,
    ) -> FiringMode {
        if let Some(mode) = metadata
            .get(FIRING_MODE_METADATA_KEY)
            .and_then(|value| value.as_str())
        {
            return FiringMode::new(mode);
        }
        self.metadata_lookup
            .firing_mode(session_id)
            .await
            .unwrap_or_default()
    }
}
