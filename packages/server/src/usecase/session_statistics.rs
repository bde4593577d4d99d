//! UseCase: セッション統計の算出
//!
//! セッションのショットをスコアリングエンジンに渡し、リング半径・統計・評価をまとめて返します。

use std::sync::Arc;

use crate::domain::{
    Point, SessionId,
    scoring::{
        PerformanceRating, RingRadii, ScoringConfig, SessionKind, SessionStatistics,
        TargetTemplate, compute_session_statistics, derive_ring_radii, rate_performance,
        score_hit,
    },
};

use super::{error::StatisticsError, session_router::SessionRouter};

/// Scoring parameters supplied per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsRequest {
    pub template: TargetTemplate,
    pub engagement_area: f64,
    pub bullseye: Point,
    pub kind: SessionKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotScore {
    pub shot_number: u32,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub kind: SessionKind,
    pub radii: RingRadii,
    pub statistics: SessionStatistics,
    pub shot_scores: Vec<ShotScore>,
    pub rating: PerformanceRating,
}

pub struct SessionStatisticsUseCase {
    router: Arc<SessionRouter>,
    config: ScoringConfig,
}

impl SessionStatisticsUseCase {
    pub fn new(router: Arc<SessionRouter>, config: ScoringConfig) -> Self {
        Self { router, config }
    }

    pub async fn execute(
        &self,
        session_id: &SessionId,
        request: StatisticsRequest,
    ) -> Result<SessionReport, StatisticsError> {
        let session = self.router.restore_session(session_id).await?;
        let radii = derive_ring_radii(&request.template, request.engagement_area, &self.config)?;

        let points: Vec<Point> = session.shots.iter().map(|shot| shot.point()).collect();
        let statistics = compute_session_statistics(&points, request.bullseye, &radii)?;
        let shot_scores = session
            .shots
            .iter()
            .map(|shot| ShotScore {
                shot_number: shot.shot_number,
                score: score_hit(shot.point(), request.bullseye, &radii),
            })
            .collect();
        let rating = rate_performance(statistics.accuracy_percentage, request.kind);

        tracing::debug!(
            "Scored session '{}': {} shots, accuracy {:.1}% ({})",
            session_id,
            statistics.shot_count,
            statistics.accuracy_percentage,
            rating.label()
        );

        Ok(SessionReport {
            session_id: session.session_id,
            kind: request.kind,
            radii,
            statistics,
            shot_scores,
            rating,
        })
    }
}
