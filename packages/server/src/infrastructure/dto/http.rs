//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ShotRecord,
    scoring::{PerformanceRating, RingRadii, SessionKind, SessionStatistics},
};

/// Session summary for `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryDto {
    pub session_id: String,
    pub is_active: bool,
    pub firing_mode: String,
    pub shot_count: usize,
    pub started_at: String,
    pub ended_at: Option<String>,
}

/// Session detail for `GET /api/sessions/{id}` and start / stop responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailDto {
    pub session_id: String,
    pub is_active: bool,
    pub firing_mode: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub shots: Vec<ShotRecord>,
}

/// Body of `POST /api/sessions/{id}/shots`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualShotRequest {
    pub x: f64,
    pub y: f64,
}

/// Query of `GET /api/sessions/{id}/statistics`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub diameter: f64,
    pub engagement_area: f64,
    pub bullseye_x: f64,
    pub bullseye_y: f64,
    #[serde(default)]
    pub kind: SessionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotScoreDto {
    pub shot_number: u32,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatisticsDto {
    pub session_id: String,
    pub kind: SessionKind,
    pub radii: RingRadii,
    pub statistics: SessionStatistics,
    pub shot_scores: Vec<ShotScoreDto>,
    pub rating: PerformanceRating,
    pub rating_label: String,
}

/// Connected hub client for `GET /api/clients`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub client_id: String,
    pub connected_at: String,
    pub subscribed_topics: Vec<String>,
    pub session_id: Option<String>,
    pub lane_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
