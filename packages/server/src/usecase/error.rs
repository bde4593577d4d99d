//! UseCase errors

use thiserror::Error;

use crate::domain::ScoringError;

/// Session Router errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// セッションがすでにアクティブ
    #[error("session '{0}' is already active")]
    AlreadyActive(String),

    /// セッションが存在しない
    #[error("session '{0}' not found")]
    NotFound(String),

    /// セッションが停止済み
    #[error("session '{0}' is not active")]
    NotActive(String),

    /// スナップショットストアの読み込み失敗
    #[error("snapshot store error: {0}")]
    Store(String),
}

/// Session statistics errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticsError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
