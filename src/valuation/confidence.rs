use super::domain::{round_to, validate_weights, ConfidenceLevel, WeightConfigError};
use super::stats::{mean, sample_std_dev};
use serde::{Deserialize, Serialize};

/// Coefficient of variation assumed when dispersion cannot be measured.
const DEFAULT_CV: f64 = 0.70;
const FLOOR_SUB_SCORE: f64 = 0.50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub sample_size: f64,
    pub price_variance: f64,
    pub distance: f64,
    pub recency: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            sample_size: 0.30,
            price_variance: 0.30,
            distance: 0.25,
            recency: 0.15,
        }
    }
}

impl ConfidenceWeights {
    pub fn validate(&self) -> Result<(), WeightConfigError> {
        validate_weights(
            "confidence",
            &[
                ("sample_size", self.sample_size),
                ("price_variance", self.price_variance),
                ("distance", self.distance),
                ("recency", self.recency),
            ],
        )
    }
}

/// Individual reliability signals, each in `[0.50, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub sample_size: f64,
    pub price_variance: f64,
    pub distance: f64,
    pub recency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub confidence: f64,
    pub level: ConfidenceLevel,
    pub breakdown: ConfidenceBreakdown,
}

#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
}

impl ConfidenceScorer {
    pub fn new(weights: ConfidenceWeights) -> Result<Self, WeightConfigError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Scores how far an estimate built from these comparables can be trusted.
    ///
    /// Degenerate inputs never fail: each sub-score falls back to its floor.
    pub fn score(
        &self,
        count: usize,
        adjusted_prices: &[f64],
        average_price: f64,
        distances_km: &[f64],
        days_since: &[i64],
    ) -> ConfidenceScore {
        let breakdown = ConfidenceBreakdown {
            sample_size: sample_size_score(count),
            price_variance: variance_score(coefficient_of_variation(adjusted_prices, average_price)),
            distance: mean(distances_km).map_or(FLOOR_SUB_SCORE, distance_score),
            recency: mean_days(days_since).map_or(FLOOR_SUB_SCORE, recency_score),
        };

        let weighted = breakdown.sample_size * self.weights.sample_size
            + breakdown.price_variance * self.weights.price_variance
            + breakdown.distance * self.weights.distance
            + breakdown.recency * self.weights.recency;
        let confidence = round_to(weighted.clamp(0.0, 1.0), 2);

        ConfidenceScore {
            confidence,
            level: ConfidenceLevel::from_score(confidence),
            breakdown,
        }
    }
}

fn coefficient_of_variation(prices: &[f64], average: f64) -> f64 {
    if prices.len() < 2 || !(average > 0.0) {
        return DEFAULT_CV;
    }
    sample_std_dev(prices) / average
}

fn mean_days(days: &[i64]) -> Option<f64> {
    if days.is_empty() {
        return None;
    }
    Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
}

fn sample_size_score(count: usize) -> f64 {
    match count {
        10.. => 1.0,
        7..=9 => 0.8,
        5..=6 => 0.65,
        3..=4 => 0.55,
        _ => FLOOR_SUB_SCORE,
    }
}

fn variance_score(cv: f64) -> f64 {
    if cv < 0.05 {
        1.0
    } else if cv < 0.10 {
        0.85
    } else if cv < 0.15 {
        0.70
    } else if cv < 0.20 {
        0.60
    } else {
        FLOOR_SUB_SCORE
    }
}

fn distance_score(mean_km: f64) -> f64 {
    if mean_km < 0.5 {
        1.0
    } else if mean_km < 1.0 {
        0.85
    } else if mean_km < 1.5 {
        0.70
    } else if mean_km < 2.0 {
        0.60
    } else {
        FLOOR_SUB_SCORE
    }
}

fn recency_score(mean_days: f64) -> f64 {
    if mean_days < 90.0 {
        1.0
    } else if mean_days < 180.0 {
        0.85
    } else if mean_days < 365.0 {
        0.70
    } else if mean_days < 540.0 {
        0.60
    } else {
        FLOOR_SUB_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(ConfidenceWeights::default()).expect("default weights are valid")
    }

    #[test]
    fn tight_close_recent_sample_scores_high() {
        let prices: Vec<f64> = [9.5, 9.6, 9.55, 9.58, 9.52, 9.56, 9.54, 9.57, 9.53, 9.59]
            .iter()
            .map(|p| p * 1_000_000.0)
            .collect();
        let distances = [0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 0.2, 0.4];
        let days = [45, 60, 75, 80, 90, 100, 110, 120, 50, 70];

        let score = scorer().score(10, &prices, 9_560_000.0, &distances, &days);

        assert_eq!(score.breakdown.sample_size, 1.0);
        assert_eq!(score.breakdown.price_variance, 1.0);
        assert_eq!(score.breakdown.distance, 0.85);
        assert_eq!(score.breakdown.recency, 1.0);
        assert_eq!(score.confidence, 0.96);
        assert_eq!(score.level, ConfidenceLevel::High);
    }

    #[test]
    fn degenerate_inputs_fall_back_to_floor_scores() {
        let score = scorer().score(1, &[5_000_000.0], 5_000_000.0, &[], &[]);
        assert_eq!(score.breakdown.sample_size, 0.50);
        assert_eq!(score.breakdown.price_variance, 0.50);
        assert_eq!(score.breakdown.distance, 0.50);
        assert_eq!(score.breakdown.recency, 0.50);
        assert_eq!(score.confidence, 0.5);
        assert_eq!(score.level, ConfidenceLevel::Medium);
    }

    #[test]
    fn sub_score_tiers() {
        assert_eq!(sample_size_score(7), 0.8);
        assert_eq!(sample_size_score(5), 0.65);
        assert_eq!(sample_size_score(3), 0.55);
        assert_eq!(sample_size_score(2), 0.50);

        assert_eq!(variance_score(0.0999), 0.85);
        assert_eq!(variance_score(0.10), 0.70);
        assert_eq!(variance_score(0.19), 0.60);
        assert_eq!(variance_score(0.70), 0.50);

        assert_eq!(distance_score(1.2), 0.70);
        assert_eq!(distance_score(1.9), 0.60);
        assert_eq!(distance_score(2.0), 0.50);

        assert_eq!(recency_score(179.0), 0.85);
        assert_eq!(recency_score(300.0), 0.70);
        assert_eq!(recency_score(539.0), 0.60);
        assert_eq!(recency_score(540.0), 0.50);
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let weights = ConfidenceWeights {
            recency: 0.5,
            ..ConfidenceWeights::default()
        };
        assert!(ConfidenceScorer::new(weights).is_err());
    }

    proptest! {
        #[test]
        fn confidence_is_bounded_and_level_matches(
            count in 0usize..30,
            prices in prop::collection::vec(1.0f64..50_000_000.0, 0..20),
            distances in prop::collection::vec(0.0f64..5.0, 0..20),
            days in prop::collection::vec(0i64..1500, 0..20),
        ) {
            let average = mean(&prices).unwrap_or(0.0);
            let score = scorer().score(count, &prices, average, &distances, &days);
            prop_assert!((0.0..=1.0).contains(&score.confidence));
            prop_assert_eq!(score.level, ConfidenceLevel::from_score(score.confidence));
            let expected = if score.confidence >= 0.75 {
                ConfidenceLevel::High
            } else if score.confidence >= 0.50 {
                ConfidenceLevel::Medium
            } else {
                ConfidenceLevel::Low
            };
            prop_assert_eq!(score.level, expected);
        }
    }
}
