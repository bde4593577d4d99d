//! Conversion logic between domain entities and DTOs.

use rangeline_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{ClientConnection, SessionState},
    infrastructure::dto::http as dto,
    usecase::{SessionReport, ShotScore},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&SessionState> for dto::SessionSummaryDto {
    fn from(model: &SessionState) -> Self {
        Self {
            session_id: model.session_id.as_str().to_string(),
            is_active: model.is_active,
            firing_mode: model.firing_mode.as_str().to_string(),
            shot_count: model.shots.len(),
            started_at: timestamp_to_rfc3339(model.started_at_millis.value()),
            ended_at: model
                .ended_at_millis
                .map(|ts| timestamp_to_rfc3339(ts.value())),
        }
    }
}

impl From<SessionState> for dto::SessionDetailDto {
    fn from(model: SessionState) -> Self {
        Self {
            session_id: model.session_id.as_str().to_string(),
            is_active: model.is_active,
            firing_mode: model.firing_mode.as_str().to_string(),
            started_at: timestamp_to_rfc3339(model.started_at_millis.value()),
            ended_at: model
                .ended_at_millis
                .map(|ts| timestamp_to_rfc3339(ts.value())),
            metadata: model.metadata.into_iter().collect(),
            shots: model.shots,
        }
    }
}

impl From<ShotScore> for dto::ShotScoreDto {
    fn from(model: ShotScore) -> Self {
        Self {
            shot_number: model.shot_number,
            score: model.score,
        }
    }
}

impl From<SessionReport> for dto::SessionStatisticsDto {
    fn from(model: SessionReport) -> Self {
        Self {
            session_id: model.session_id.into_string(),
            kind: model.kind,
            radii: model.radii,
            statistics: model.statistics,
            shot_scores: model.shot_scores.into_iter().map(Into::into).collect(),
            rating: model.rating,
            rating_label: model.rating.label().to_string(),
        }
    }
}

impl From<ClientConnection> for dto::ClientDto {
    fn from(model: ClientConnection) -> Self {
        Self {
            client_id: model.client_id.into_string(),
            connected_at: timestamp_to_rfc3339(model.connected_at_millis.value()),
            subscribed_topics: model.subscribed_topics.into_iter().collect(),
            session_id: model.session_id,
            lane_id: model.lane_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, FiringMode, SessionId, SessionMetadata, Timestamp};

    #[test]
    fn test_session_state_to_summary() {
        // テスト項目: SessionState から一覧用 DTO に変換され、時刻が RFC 3339 になる
        // given (前提条件):
        let mut state = SessionState::new(
            SessionId::new("S1".to_string()).unwrap(),
            FiringMode::live_grid(),
            SessionMetadata::new(),
            Timestamp::new(0),
        );
        state.mark_stopped(Timestamp::new(1_500));

        // when (操作):
        let dto = dto::SessionSummaryDto::from(&state);

        // then (期待する結果):
        assert_eq!(dto.session_id, "S1");
        assert!(!dto.is_active);
        assert_eq!(dto.firing_mode, "live_grid");
        assert_eq!(dto.shot_count, 0);
        assert_eq!(dto.started_at, "1970-01-01T00:00:00.000Z");
        assert_eq!(dto.ended_at.as_deref(), Some("1970-01-01T00:00:01.500Z"));
    }

    #[test]
    fn test_connection_to_client_dto() {
        // テスト項目: ClientConnection がクライアント DTO に変換される
        // given (前提条件):
        let mut connection = ClientConnection::new(
            ClientId::new("client_1_abc".to_string()).unwrap(),
            Timestamp::new(0),
        );
        connection.subscribe(["sessions", "irShot"]);
        connection.join(Some("S1".to_string()), None);

        // when (操作):
        let dto = dto::ClientDto::from(connection);

        // then (期待する結果):
        assert_eq!(dto.client_id, "client_1_abc");
        assert_eq!(dto.subscribed_topics, vec!["irShot", "sessions"]);
        assert_eq!(dto.session_id.as_deref(), Some("S1"));
        assert_eq!(dto.lane_id, None);
    }
}
