//! Scoring geometry.
//!
//! Pure functions over points and ring radii. Nothing here holds state;
//! radii are derived per call from the target template and engagement area.

use serde::{Deserialize, Serialize};

use super::{error::ScoringError, value_object::Point};

/// Highest zone score.
pub const MAX_ZONE_SCORE: u8 = 3;

/// Physical target the shots are scored against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTemplate {
    pub diameter_millimeters: f64,
}

/// Zone boundaries, in device units. Always `inner < engagement_area < outer_bullseye`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingRadii {
    pub inner_radius: f64,
    pub engagement_area_radius: f64,
    pub outer_bullseye_radius: f64,
}

/// Proportionality constants used by [`derive_ring_radii`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Inner ring as a fraction of the engagement-area radius, in `(0, 1)`.
    pub inner_ratio: f64,
    /// Outer ring margin beyond the engagement area, as a fraction of the target radius.
    pub outer_margin_ratio: f64,
    /// Device units per millimeter on the target plane.
    pub units_per_millimeter: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            inner_ratio: 0.5,
            outer_margin_ratio: 0.25,
            units_per_millimeter: 1.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if !(self.inner_ratio > 0.0 && self.inner_ratio < 1.0) {
            return Err(ScoringError::InvalidConfig(format!(
                "inner ratio must be in (0, 1), got {}",
                self.inner_ratio
            )));
        }
        if !(self.outer_margin_ratio.is_finite() && self.outer_margin_ratio > 0.0) {
            return Err(ScoringError::InvalidConfig(format!(
                "outer margin ratio must be positive, got {}",
                self.outer_margin_ratio
            )));
        }
        if !(self.units_per_millimeter.is_finite() && self.units_per_millimeter > 0.0) {
            return Err(ScoringError::InvalidConfig(format!(
                "units per millimeter must be positive, got {}",
                self.units_per_millimeter
            )));
        }
        Ok(())
    }
}

/// Graded test or practice; tests use stricter rating thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Test,
    #[default]
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl PerformanceRating {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Minimum accuracy (percent) per rating, checked top to bottom.
const TEST_RATING_THRESHOLDS: [(f64, PerformanceRating); 3] = [
    (90.0, PerformanceRating::Excellent),
    (75.0, PerformanceRating::Good),
    (60.0, PerformanceRating::Satisfactory),
];

const PRACTICE_RATING_THRESHOLDS: [(f64, PerformanceRating); 3] = [
    (80.0, PerformanceRating::Excellent),
    (65.0, PerformanceRating::Good),
    (50.0, PerformanceRating::Satisfactory),
];

/// Aggregate statistics over one shot set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatistics {
    pub mean_point_of_impact: Point,
    pub mpi_distance: f64,
    pub group_size: f64,
    pub accuracy_percentage: f64,
    pub total_score: u32,
    pub shot_count: usize,
}

/// Derive the three zone radii.
///
/// ```text
/// engagement = engagement_area * units_per_mm
/// inner      = engagement * inner_ratio
/// outer      = engagement + diameter / 2 * outer_margin_ratio * units_per_mm
/// ```
pub fn derive_ring_radii(
    template: &TargetTemplate,
    engagement_area: f64,
    config: &ScoringConfig,
) -> Result<RingRadii, ScoringError> {
    config.validate()?;
    let diameter = template.diameter_millimeters;
    if !(diameter.is_finite() && diameter > 0.0) {
        return Err(ScoringError::InvalidTemplate(diameter));
    }
    if !(engagement_area.is_finite() && engagement_area > 0.0) {
        return Err(ScoringError::InvalidEngagementArea(engagement_area));
    }

    let engagement_area_radius = engagement_area * config.units_per_millimeter;
    let inner_radius = engagement_area_radius * config.inner_ratio;
    let outer_bullseye_radius = engagement_area_radius
        + diameter / 2.0 * config.outer_margin_ratio * config.units_per_millimeter;

    // Extreme magnitudes can overflow or absorb the margin in rounding.
    let ordered = inner_radius < engagement_area_radius
        && engagement_area_radius < outer_bullseye_radius;
    if !(ordered && outer_bullseye_radius.is_finite() && inner_radius > 0.0) {
        return Err(ScoringError::DegenerateRadii {
            inner: inner_radius,
            engagement: engagement_area_radius,
            outer: outer_bullseye_radius,
        });
    }

    Ok(RingRadii {
        inner_radius,
        engagement_area_radius,
        outer_bullseye_radius,
    })
}

/// Zone score of a hit: 3 inside the inner ring, 2 inside the engagement
/// area, 1 inside the outer bullseye, else 0. Boundaries belong to the
/// higher score.
pub fn score_hit(hit: Point, bullseye: Point, radii: &RingRadii) -> u8 {
    let distance = hit.distance_to(&bullseye);
    if distance <= radii.inner_radius {
        3
    } else if distance <= radii.engagement_area_radius {
        2
    } else if distance <= radii.outer_bullseye_radius {
        1
    } else {
        0
    }
}

/// MPI, its distance from the bullseye, extreme spread and accuracy.
///
/// Group size is the maximum pairwise distance; the quadratic scan is fine
/// for per-session shot counts.
pub fn compute_session_statistics(
    shots: &[Point],
    bullseye: Point,
    radii: &RingRadii,
) -> Result<SessionStatistics, ScoringError> {
    if shots.is_empty() {
        return Err(ScoringError::EmptyShotSet);
    }

    let count = shots.len() as f64;
    let (sum_x, sum_y) = shots
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let mean_point_of_impact = Point::new(sum_x / count, sum_y / count);

    let mut group_size: f64 = 0.0;
    for (i, a) in shots.iter().enumerate() {
        for b in &shots[i + 1..] {
            group_size = group_size.max(a.distance_to(b));
        }
    }

    let total_score: u32 = shots
        .iter()
        .map(|shot| u32::from(score_hit(*shot, bullseye, radii)))
        .sum();
    let accuracy_percentage = f64::from(total_score) / (count * f64::from(MAX_ZONE_SCORE)) * 100.0;

    Ok(SessionStatistics {
        mean_point_of_impact,
        mpi_distance: mean_point_of_impact.distance_to(&bullseye),
        group_size,
        accuracy_percentage,
        total_score,
        shot_count: shots.len(),
    })
}

/// Look up the rating for an accuracy percentage.
pub fn rate_performance(accuracy_percentage: f64, kind: SessionKind) -> PerformanceRating {
    let table = match kind {
        SessionKind::Test => &TEST_RATING_THRESHOLDS,
        SessionKind::Practice => &PRACTICE_RATING_THRESHOLDS,
    };
    table
        .iter()
        .find(|(minimum, _)| accuracy_percentage >= *minimum)
        .map(|(_, rating)| *rating)
        .unwrap_or(PerformanceRating::NeedsImprovement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radii_120_30() -> RingRadii {
        derive_ring_radii(
            &TargetTemplate {
                diameter_millimeters: 120.0,
            },
            30.0,
            &ScoringConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_derive_ring_radii_regression_fixture() {
        // テスト項目: 直径 120mm / エンゲージメントエリア 30mm で半径の順序が保たれる
        // given (前提条件):
        // when (操作):
        let radii = radii_120_30();

        // then (期待する結果):
        assert!(radii.inner_radius < radii.engagement_area_radius);
        assert!(radii.engagement_area_radius < radii.outer_bullseye_radius);
        assert_eq!(radii.inner_radius, 15.0);
        assert_eq!(radii.engagement_area_radius, 30.0);
        assert_eq!(radii.outer_bullseye_radius, 45.0);
    }

    #[test]
    fn test_derive_ring_radii_ordering_over_grid() {
        // テスト項目: 正の直径・エンゲージメントエリアの組み合わせで常に順序が保たれる
        // given (前提条件):
        let diameters = [0.5, 10.0, 120.0, 1000.0];
        let areas = [0.1, 5.0, 30.0, 500.0];
        let configs = [
            ScoringConfig::default(),
            ScoringConfig {
                inner_ratio: 0.9,
                outer_margin_ratio: 0.01,
                units_per_millimeter: 3.5,
            },
        ];

        for config in &configs {
            for diameter in diameters {
                for area in areas {
                    // when (操作):
                    let radii = derive_ring_radii(
                        &TargetTemplate {
                            diameter_millimeters: diameter,
                        },
                        area,
                        config,
                    )
                    .unwrap();

                    // then (期待する結果):
                    assert!(radii.inner_radius < radii.engagement_area_radius);
                    assert!(radii.engagement_area_radius < radii.outer_bullseye_radius);
                }
            }
        }
    }

    #[test]
    fn test_derive_ring_radii_rejects_degenerate_magnitudes() {
        // テスト項目: 極端な値で半径の順序が崩れる・オーバーフローする場合はエラーになる
        // given (前提条件):
        let tiny_target = TargetTemplate {
            diameter_millimeters: 0.5,
        };
        let target = TargetTemplate {
            diameter_millimeters: 120.0,
        };
        let scaled = ScoringConfig {
            units_per_millimeter: 3.5,
            ..ScoringConfig::default()
        };

        // when (操作):
        let absorbed_margin = derive_ring_radii(&tiny_target, 1e17, &ScoringConfig::default());
        let overflow = derive_ring_radii(&target, 1e308, &scaled);

        // then (期待する結果):
        assert!(matches!(
            absorbed_margin,
            Err(ScoringError::DegenerateRadii { .. })
        ));
        assert!(matches!(overflow, Err(ScoringError::DegenerateRadii { .. })));
    }

    #[test]
    fn test_derive_ring_radii_rejects_invalid_input() {
        // テスト項目: 0 以下や非有限の入力、不正な設定はエラーになる
        // given (前提条件):
        let template = TargetTemplate {
            diameter_millimeters: 120.0,
        };
        let zero = TargetTemplate {
            diameter_millimeters: 0.0,
        };
        let bad_config = ScoringConfig {
            inner_ratio: 1.0,
            ..ScoringConfig::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(
            derive_ring_radii(&zero, 30.0, &ScoringConfig::default()),
            Err(ScoringError::InvalidTemplate(0.0))
        );
        assert_eq!(
            derive_ring_radii(&template, -1.0, &ScoringConfig::default()),
            Err(ScoringError::InvalidEngagementArea(-1.0))
        );
        assert!(matches!(
            derive_ring_radii(&template, f64::NAN, &ScoringConfig::default()),
            Err(ScoringError::InvalidEngagementArea(_))
        ));
        assert!(matches!(
            derive_ring_radii(&template, 30.0, &bad_config),
            Err(ScoringError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_score_hit_boundaries() {
        // テスト項目: 境界上の距離は高い方のスコアになり、外側を超えると 0 になる
        // given (前提条件):
        let radii = radii_120_30();
        let bullseye = Point::new(200.0, 200.0);

        // when (操作) / then (期待する結果):
        assert_eq!(score_hit(Point::new(200.0, 200.0), bullseye, &radii), 3);
        assert_eq!(score_hit(Point::new(215.0, 200.0), bullseye, &radii), 3);
        assert_eq!(score_hit(Point::new(215.001, 200.0), bullseye, &radii), 2);
        assert_eq!(score_hit(Point::new(200.0, 230.0), bullseye, &radii), 2);
        assert_eq!(score_hit(Point::new(155.0, 200.0), bullseye, &radii), 1);
        assert_eq!(score_hit(Point::new(245.0001, 200.0), bullseye, &radii), 0);
    }

    #[test]
    fn test_compute_session_statistics_fixture() {
        // テスト項目: 3 発の MPI・MPI 距離・グループサイズが計算される
        // given (前提条件):
        let radii = radii_120_30();
        let bullseye = Point::new(200.0, 200.0);
        let shots = [
            Point::new(200.0, 200.0),
            Point::new(210.0, 210.0),
            Point::new(190.0, 190.0),
        ];

        // when (操作):
        let stats = compute_session_statistics(&shots, bullseye, &radii).unwrap();

        // then (期待する結果):
        assert!((stats.mean_point_of_impact.x - 200.0).abs() < 1e-9);
        assert!((stats.mean_point_of_impact.y - 200.0).abs() < 1e-9);
        assert!(stats.mpi_distance.abs() < 1e-9);
        let expected_group = Point::new(210.0, 210.0).distance_to(&Point::new(190.0, 190.0));
        assert!((stats.group_size - expected_group).abs() < 1e-9);
        // 全弾が内側リング（半径 15）以内: 0, 14.14, 14.14
        assert_eq!(stats.total_score, 9);
        assert!((stats.accuracy_percentage - 100.0).abs() < 1e-9);
        assert_eq!(stats.shot_count, 3);
    }

    #[test]
    fn test_compute_session_statistics_mixed_scores() {
        // テスト項目: 命中精度が合計スコア / (発数 * 3) で計算される
        // given (前提条件):
        let radii = radii_120_30();
        let bullseye = Point::new(0.0, 0.0);
        let shots = [
            Point::new(0.0, 10.0),  // 3
            Point::new(25.0, 0.0),  // 2
            Point::new(0.0, -40.0), // 1
            Point::new(100.0, 0.0), // 0
        ];

        // when (操作):
        let stats = compute_session_statistics(&shots, bullseye, &radii).unwrap();

        // then (期待する結果):
        assert_eq!(stats.total_score, 6);
        assert!((stats.accuracy_percentage - 50.0).abs() < 1e-9);
        assert!((stats.group_size - Point::new(0.0, -40.0).distance_to(&Point::new(100.0, 0.0))).abs() < 1e-9);
    }

    #[test]
    fn test_compute_session_statistics_single_and_empty() {
        // テスト項目: 1 発ならグループサイズ 0、0 発ならエラー
        // given (前提条件):
        let radii = radii_120_30();
        let bullseye = Point::new(0.0, 0.0);

        // when (操作):
        let single = compute_session_statistics(&[Point::new(3.0, 4.0)], bullseye, &radii).unwrap();
        let empty = compute_session_statistics(&[], bullseye, &radii);

        // then (期待する結果):
        assert_eq!(single.group_size, 0.0);
        assert!((single.mpi_distance - 5.0).abs() < 1e-9);
        assert_eq!(empty, Err(ScoringError::EmptyShotSet));
    }

    #[test]
    fn test_rate_performance_tables() {
        // テスト項目: テストは練習より厳しい閾値で評価される
        // given (前提条件):
        let cases = [
            (95.0, SessionKind::Test, PerformanceRating::Excellent),
            (85.0, SessionKind::Test, PerformanceRating::Good),
            (85.0, SessionKind::Practice, PerformanceRating::Excellent),
            (75.0, SessionKind::Test, PerformanceRating::Good),
            (62.0, SessionKind::Test, PerformanceRating::Satisfactory),
            (62.0, SessionKind::Practice, PerformanceRating::Satisfactory),
            (55.0, SessionKind::Test, PerformanceRating::NeedsImprovement),
            (55.0, SessionKind::Practice, PerformanceRating::Satisfactory),
            (0.0, SessionKind::Practice, PerformanceRating::NeedsImprovement),
        ];

        for (accuracy, kind, expected) in cases {
            // when (操作):
            let rating = rate_performance(accuracy, kind);

            // then (期待する結果):
            assert_eq!(rating, expected, "{} / {:?}", accuracy, kind);
        }
    }

    #[test]
    fn test_session_kind_deserializes_lowercase() {
        // テスト項目: SessionKind は小文字でデシリアライズされる
        // given (前提条件):
        let json = "\"test\"";

        // when (操作):
        let kind: SessionKind = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(kind, SessionKind::Test);
        assert_eq!(SessionKind::default(), SessionKind::Practice);
    }
}
