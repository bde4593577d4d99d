//! HTTP API errors.
//!
//! UseCase のエラーを HTTP ステータスと `{"error": ...}` ボディに変換します。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::{ScoringError, ValueObjectError},
    infrastructure::dto::http::ErrorDto,
    usecase::{SessionError, StatisticsError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<StatisticsError> for ApiError {
    fn from(e: StatisticsError) -> Self {
        match e {
            StatisticsError::Session(e) => Self::Session(e),
            StatisticsError::Scoring(e) => Self::Scoring(e),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Scoring(_) => StatusCode::BAD_REQUEST,
            Self::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Session(SessionError::AlreadyActive(_) | SessionError::NotActive(_)) => {
                StatusCode::CONFLICT
            }
            Self::Session(SessionError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        let body = ErrorDto {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
