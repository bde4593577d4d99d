//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::{Point, SessionId, SessionMetadata, ShotRecord, scoring::TargetTemplate},
    infrastructure::dto::http::{
        ClientDto, ManualShotRequest, SessionDetailDto, SessionStatisticsDto,
        SessionSummaryDto, StatisticsQuery,
    },
    ui::{error::ApiError, state::AppState},
    usecase::StatisticsRequest,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of tracked sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state.router.list_sessions().await;

    // Domain Model から DTO への変換
    Json(sessions.iter().map(SessionSummaryDto::from).collect())
}

/// Get session detail by ID
///
/// メモリにないセッションはスナップショットから復元します。
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailDto>, ApiError> {
    let session_id = SessionId::new(session_id)?;
    let session = state.router.restore_session(&session_id).await?;
    Ok(Json(session.into()))
}

/// Start a session
///
/// ボディは任意のメタデータ（JSON オブジェクト）。空ボディは空のメタデータとして扱います。
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionDetailDto>), ApiError> {
    let session_id = SessionId::new(session_id)?;
    let metadata: SessionMetadata = if body.iter().all(u8::is_ascii_whitespace) {
        SessionMetadata::new()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::InvalidRequest(format!("metadata must be a JSON object: {e}")))?
    };

    let session = state.session_control.start(session_id, metadata).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Stop a session
pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailDto>, ApiError> {
    let session_id = SessionId::new(session_id)?;
    let session = state.session_control.stop(&session_id).await?;
    Ok(Json(session.into()))
}

/// Record a manually entered shot
pub async fn record_shot(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ManualShotRequest>,
) -> Result<(StatusCode, Json<ShotRecord>), ApiError> {
    if !(request.x.is_finite() && request.y.is_finite()) {
        return Err(ApiError::InvalidRequest(
            "shot coordinates must be finite numbers".to_string(),
        ));
    }
    let session_id = SessionId::new(session_id)?;
    let shot = state
        .router
        .record_manual_shot(&session_id, Point::new(request.x, request.y))
        .await?;
    Ok((StatusCode::CREATED, Json(shot)))
}

/// Score the shots of a session
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<SessionStatisticsDto>, ApiError> {
    let session_id = SessionId::new(session_id)?;
    let request = StatisticsRequest {
        template: TargetTemplate {
            diameter_millimeters: query.diameter,
        },
        engagement_area: query.engagement_area,
        bullseye: Point::new(query.bullseye_x, query.bullseye_y),
        kind: query.kind,
    };
    let report = state.statistics.execute(&session_id, request).await?;
    Ok(Json(report.into()))
}

/// Get list of connected hub clients
pub async fn list_clients(State(state): State<Arc<AppState>>) -> Json<Vec<ClientDto>> {
    let connections = state.hub.connections().await;
    Json(connections.into_iter().map(ClientDto::from).collect())
}
