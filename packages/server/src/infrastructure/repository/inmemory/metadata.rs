//! InMemory SessionMetadataLookup 実装
//!
//! 管理側のセッション定義が未接続の環境で使う固定テーブルです。既定では空。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{FiringMode, SessionId, SessionMetadataLookup};

#[derive(Debug, Clone, Default)]
pub struct StaticMetadataLookup {
    firing_modes: HashMap<SessionId, FiringMode>,
}

impl StaticMetadataLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_firing_mode(mut self, session_id: SessionId, mode: FiringMode) -> Self {
        self.firing_modes.insert(session_id, mode);
        self
    }
}

#[async_trait]
impl SessionMetadataLookup for StaticMetadataLookup {
    async fn firing_mode(&self, session_id: &SessionId) -> Option<FiringMode> {
        self.firing_modes.get(session_id).cloned()
    }
}
