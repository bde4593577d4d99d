//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    BroadcastHub, SessionControlUseCase, SessionRouter, SessionStatisticsUseCase,
};

pub struct AppState {
    /// Session Router（セッション表の参照）
    pub router: Arc<SessionRouter>,
    /// Broadcast Hub（WebSocket クライアントの管理）
    pub hub: Arc<BroadcastHub>,
    /// セッションの開始・停止
    pub session_control: Arc<SessionControlUseCase>,
    /// セッション統計の算出
    pub statistics: Arc<SessionStatisticsUseCase>,
}

impl AppState {
    pub fn new(
        router: Arc<SessionRouter>,
        hub: Arc<BroadcastHub>,
        statistics: Arc<SessionStatisticsUseCase>,
    ) -> Self {
        let session_control = Arc::new(SessionControlUseCase::new(router.clone(), hub.clone()));
        Self {
            router,
            hub,
            session_control,
            statistics,
        }
    }
}
