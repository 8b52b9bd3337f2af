use super::confidence::{ConfidenceScore, ConfidenceScorer};
use super::domain::{AdjustedTransaction, PricePrediction, ValuationError};
use super::stats::{iqr_fences, mean, sample_std_dev};

/// Turns adjusted comparables into a price band for the target parcel.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    scorer: ConfidenceScorer,
}

impl PricePredictor {
    pub fn new(scorer: ConfidenceScorer) -> Self {
        Self { scorer }
    }

    /// Outliers are dropped before averaging; confidence is scored on the
    /// comparables that survive.
    pub fn predict(
        &self,
        adjusted: &[AdjustedTransaction],
        target_size_sqm: f64,
    ) -> Result<(PricePrediction, ConfidenceScore), ValuationError> {
        if adjusted.is_empty() {
            return Err(ValuationError::invalid(
                "comparables",
                "cannot predict a price without comparables",
            ));
        }
        if !(target_size_sqm.is_finite() && target_size_sqm > 0.0) {
            return Err(ValuationError::invalid(
                "land_size_sqm",
                format!("must be positive, got {target_size_sqm}"),
            ));
        }

        let kept = remove_outliers(adjusted);
        let prices: Vec<f64> = kept.iter().map(|tx| tx.adjusted_price_per_sqm).collect();
        let distances: Vec<f64> = kept.iter().map(|tx| tx.transaction.distance_km).collect();
        let days: Vec<i64> = kept
            .iter()
            .map(|tx| tx.transaction.days_since_transaction)
            .collect();

        let avg = mean(&prices).unwrap_or_default();
        let std = sample_std_dev(&prices);
        let score = self
            .scorer
            .score(prices.len(), &prices, avg, &distances, &days);

        let prediction = PricePrediction {
            low: ((avg - std) * target_size_sqm).round(),
            avg: (avg * target_size_sqm).round(),
            high: ((avg + std) * target_size_sqm).round(),
            price_per_sqm_avg: avg.round(),
            price_per_sqm_low: (avg - std).round(),
            price_per_sqm_high: (avg + std).round(),
            price_per_sqm_std: std.round(),
            confidence: score.confidence,
            confidence_level: score.level,
            sample_count: kept.len(),
            outliers_removed: adjusted.len() - kept.len(),
        };

        Ok((prediction, score))
    }
}

/// IQR outlier filter on adjusted unit prices, applied from four comparables
/// up. Falls back to the full list rather than returning nothing.
pub fn remove_outliers(adjusted: &[AdjustedTransaction]) -> Vec<&AdjustedTransaction> {
    let prices: Vec<f64> = adjusted.iter().map(|tx| tx.adjusted_price_per_sqm).collect();
    let Some((lower, upper)) = iqr_fences(&prices) else {
        return adjusted.iter().collect();
    };

    let kept: Vec<&AdjustedTransaction> = adjusted
        .iter()
        .filter(|tx| (lower..=upper).contains(&tx.adjusted_price_per_sqm))
        .collect();

    if kept.is_empty() {
        adjusted.iter().collect()
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::confidence::ConfidenceWeights;
    use crate::valuation::domain::{
        AdjustmentFactors, ComparableTransaction, ConfidenceLevel, ZoneType,
    };
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn adjusted(price_per_sqm: f64) -> AdjustedTransaction {
        AdjustedTransaction {
            transaction: ComparableTransaction {
                address: "대구광역시 수성구 범어동 10-1".to_string(),
                lat: 35.858,
                lng: 128.63,
                size_sqm: 300.0,
                price_per_sqm,
                total_price: price_per_sqm * 300.0,
                zone_type: ZoneType::GeneralResidential2,
                transaction_date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
                distance_km: 0.4,
                days_since_transaction: 60,
            },
            factors: AdjustmentFactors {
                distance: 0.0,
                time: 0.0,
                size: 0.0,
                zone: 0.0,
                total: 0.0,
            },
            adjusted_price_per_sqm: price_per_sqm,
            adjusted_total_price: price_per_sqm * 300.0,
        }
    }

    fn predictor() -> PricePredictor {
        PricePredictor::new(
            ConfidenceScorer::new(ConfidenceWeights::default()).expect("default weights"),
        )
    }

    #[test]
    fn extreme_prices_are_removed_before_averaging() {
        let comparables: Vec<_> = [
            4_000_000.0,
            4_100_000.0,
            4_200_000.0,
            4_150_000.0,
            4_050_000.0,
            4_250_000.0,
            4_100_000.0,
            40_000_000.0,
        ]
        .into_iter()
        .map(adjusted)
        .collect();

        let (prediction, _) = predictor().predict(&comparables, 100.0).expect("prediction");
        assert_eq!(prediction.outliers_removed, 1);
        assert_eq!(prediction.sample_count, 7);
        assert_eq!(prediction.price_per_sqm_avg, 4_121_429.0);
        assert_eq!(prediction.avg, 412_142_857.0);
        assert!(prediction.low < prediction.avg && prediction.avg < prediction.high);
    }

    #[test]
    fn small_samples_are_not_filtered() {
        let comparables: Vec<_> = [1_000_000.0, 1_100_000.0, 9_000_000.0]
            .into_iter()
            .map(adjusted)
            .collect();
        assert_eq!(remove_outliers(&comparables).len(), 3);
    }

    #[test]
    fn single_comparable_has_zero_spread() {
        let (prediction, score) = predictor()
            .predict(&[adjusted(2_000_000.0)], 50.0)
            .expect("prediction");
        assert_eq!(prediction.low, 100_000_000.0);
        assert_eq!(prediction.avg, 100_000_000.0);
        assert_eq!(prediction.high, 100_000_000.0);
        assert_eq!(prediction.price_per_sqm_std, 0.0);
        assert_eq!(score.breakdown.price_variance, 0.50);
        assert_eq!(prediction.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(predictor().predict(&[], 100.0).is_err());
    }

    proptest! {
        #[test]
        fn outlier_filter_never_grows_or_empties(
            prices in prop::collection::vec(1_000.0f64..100_000_000.0, 1..40),
        ) {
            let comparables: Vec<_> = prices.iter().copied().map(adjusted).collect();
            let kept = remove_outliers(&comparables);
            prop_assert!(!kept.is_empty());
            prop_assert!(kept.len() <= comparables.len());
        }

        #[test]
        fn band_is_ordered(
            prices in prop::collection::vec(1_000.0f64..100_000_000.0, 2..40),
            size in 1.0f64..5_000.0,
        ) {
            let comparables: Vec<_> = prices.iter().copied().map(adjusted).collect();
            let (prediction, _) = predictor().predict(&comparables, size).expect("prediction");
            prop_assert!(prediction.low <= prediction.avg);
            prop_assert!(prediction.avg <= prediction.high);
            prop_assert!(prediction.price_per_sqm_low <= prediction.price_per_sqm_high);
        }
    }
}
