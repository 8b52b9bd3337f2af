use super::domain::{
    validate_weights, AdjustedTransaction, AdjustmentFactors, ComparableTransaction,
    WeightConfigError, ZoneType,
};
use serde::{Deserialize, Serialize};

/// The combined adjustment never discounts a comparable by more than this.
pub const ADJUSTMENT_FLOOR: f64 = -0.15;

/// Relative importance of each adjustment factor. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentWeights {
    pub distance: f64,
    pub time: f64,
    pub size: f64,
    pub zone: f64,
}

impl Default for AdjustmentWeights {
    fn default() -> Self {
        Self {
            distance: 0.35,
            time: 0.25,
            size: 0.25,
            zone: 0.15,
        }
    }
}

impl AdjustmentWeights {
    pub fn validate(&self) -> Result<(), WeightConfigError> {
        validate_weights(
            "adjustment",
            &[
                ("distance", self.distance),
                ("time", self.time),
                ("size", self.size),
                ("zone", self.zone),
            ],
        )
    }
}

/// Normalizes comparable unit prices toward the target parcel.
#[derive(Debug, Clone)]
pub struct PriceAdjuster {
    weights: AdjustmentWeights,
}

impl PriceAdjuster {
    /// Refuses to build with a weight set that does not sum to 1.0.
    pub fn new(weights: AdjustmentWeights) -> Result<Self, WeightConfigError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn adjust(
        &self,
        transactions: Vec<ComparableTransaction>,
        target_size_sqm: f64,
        target_zone: ZoneType,
    ) -> Vec<AdjustedTransaction> {
        transactions
            .into_iter()
            .map(|transaction| {
                let factors = self.factors(&transaction, target_size_sqm, target_zone);
                // unrounded; only report views round to whole won
                let adjusted_price_per_sqm = transaction.price_per_sqm * (1.0 + factors.total);
                let adjusted_total_price = adjusted_price_per_sqm * transaction.size_sqm;

                AdjustedTransaction {
                    transaction,
                    factors,
                    adjusted_price_per_sqm,
                    adjusted_total_price,
                }
            })
            .collect()
    }

    pub fn factors(
        &self,
        transaction: &ComparableTransaction,
        target_size_sqm: f64,
        target_zone: ZoneType,
    ) -> AdjustmentFactors {
        let distance = distance_adjustment(transaction.distance_km);
        let time = time_adjustment(transaction.days_since_transaction);
        let size = size_adjustment(transaction.size_sqm / target_size_sqm);
        let zone = zone_adjustment(transaction.zone_type, target_zone);

        let weighted = distance * self.weights.distance
            + time * self.weights.time
            + size * self.weights.size
            + zone * self.weights.zone;

        AdjustmentFactors {
            distance,
            time,
            size,
            zone,
            total: weighted.clamp(ADJUSTMENT_FLOOR, 0.0),
        }
    }
}

pub(crate) fn distance_adjustment(distance_km: f64) -> f64 {
    if distance_km < 0.3 {
        0.0
    } else if distance_km < 1.0 {
        -0.03
    } else if distance_km < 2.0 {
        -0.06
    } else {
        -0.12
    }
}

pub(crate) fn time_adjustment(days_since: i64) -> f64 {
    if days_since < 180 {
        0.0
    } else if days_since < 365 {
        -0.03
    } else if days_since < 730 {
        -0.06
    } else {
        -0.12
    }
}

pub(crate) fn size_adjustment(ratio: f64) -> f64 {
    if (0.7..=1.3).contains(&ratio) {
        0.0
    } else if (0.5..=1.5).contains(&ratio) {
        -0.04
    } else {
        -0.08
    }
}

pub(crate) fn zone_adjustment(comparable: ZoneType, target: ZoneType) -> f64 {
    if comparable == target {
        0.0
    } else if comparable.is_residential() && target.is_residential() {
        -0.03
    } else {
        -0.05
    }
}
