//! UseCase: セッションの開始・停止
//!
//! Session Router の状態を変更し、結果をハブ経由でクライアントに通知します。

use std::sync::Arc;

use crate::domain::{SessionId, SessionMetadata, SessionState};

use super::{
    broadcast_hub::{BroadcastHub, SessionEventKind},
    error::SessionError,
    session_router::SessionRouter,
};

pub struct SessionControlUseCase {
    router: Arc<SessionRouter>,
    hub: Arc<BroadcastHub>,
}

impl SessionControlUseCase {
    pub fn new(router: Arc<SessionRouter>, hub: Arc<BroadcastHub>) -> Self {
        Self { router, hub }
    }

    pub async fn start(
        &self,
        session_id: SessionId,
        metadata: SessionMetadata,
    ) -> Result<SessionState, SessionError> {
        let state = self.router.start_session(session_id, metadata).await?;
        self.hub
            .send_session_event(SessionEventKind::Started, &state)
            .await;
        Ok(state)
    }

    /// 停止済みのセッションでは状態を返すだけで通知しません。
    pub async fn stop(&self, session_id: &SessionId) -> Result<SessionState, SessionError> {
        let (state, stopped_now) = self.router.stop_session_tracked(session_id).await?;
        if stopped_now {
            self.hub
                .send_session_event(SessionEventKind::Stopped, &state)
                .await;
        }
        Ok(state)
    }
}
