use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Land-use zoning classification of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    #[serde(rename = "exclusive_residential_1")]
    ExclusiveResidential1,
    #[serde(rename = "exclusive_residential_2")]
    ExclusiveResidential2,
    #[serde(rename = "general_residential_1")]
    GeneralResidential1,
    #[serde(rename = "general_residential_2")]
    GeneralResidential2,
    #[serde(rename = "general_residential_3")]
    GeneralResidential3,
    SemiResidential,
    CentralCommercial,
    GeneralCommercial,
    NeighborhoodCommercial,
    SemiIndustrial,
    GeneralIndustrial,
    NaturalGreen,
    ProductionGreen,
    PlannedManagement,
}

impl ZoneType {
    pub const fn ordered() -> [Self; 14] {
        [
            Self::ExclusiveResidential1,
            Self::ExclusiveResidential2,
            Self::GeneralResidential1,
            Self::GeneralResidential2,
            Self::GeneralResidential3,
            Self::SemiResidential,
            Self::CentralCommercial,
            Self::GeneralCommercial,
            Self::NeighborhoodCommercial,
            Self::SemiIndustrial,
            Self::GeneralIndustrial,
            Self::NaturalGreen,
            Self::ProductionGreen,
            Self::PlannedManagement,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ExclusiveResidential1 => "제1종전용주거지역",
            Self::ExclusiveResidential2 => "제2종전용주거지역",
            Self::GeneralResidential1 => "제1종일반주거지역",
            Self::GeneralResidential2 => "제2종일반주거지역",
            Self::GeneralResidential3 => "제3종일반주거지역",
            Self::SemiResidential => "준주거지역",
            Self::CentralCommercial => "중심상업지역",
            Self::GeneralCommercial => "일반상업지역",
            Self::NeighborhoodCommercial => "근린상업지역",
            Self::SemiIndustrial => "준공업지역",
            Self::GeneralIndustrial => "일반공업지역",
            Self::NaturalGreen => "자연녹지지역",
            Self::ProductionGreen => "생산녹지지역",
            Self::PlannedManagement => "계획관리지역",
        }
    }

    pub const fn identifier(self) -> &'static str {
        match self {
            Self::ExclusiveResidential1 => "exclusive_residential_1",
            Self::ExclusiveResidential2 => "exclusive_residential_2",
            Self::GeneralResidential1 => "general_residential_1",
            Self::GeneralResidential2 => "general_residential_2",
            Self::GeneralResidential3 => "general_residential_3",
            Self::SemiResidential => "semi_residential",
            Self::CentralCommercial => "central_commercial",
            Self::GeneralCommercial => "general_commercial",
            Self::NeighborhoodCommercial => "neighborhood_commercial",
            Self::SemiIndustrial => "semi_industrial",
            Self::GeneralIndustrial => "general_industrial",
            Self::NaturalGreen => "natural_green",
            Self::ProductionGreen => "production_green",
            Self::PlannedManagement => "planned_management",
        }
    }

    /// Member of the fixed residential set used by the zone adjustment.
    pub const fn is_residential(self) -> bool {
        matches!(
            self,
            Self::ExclusiveResidential1
                | Self::ExclusiveResidential2
                | Self::GeneralResidential1
                | Self::GeneralResidential2
                | Self::GeneralResidential3
                | Self::SemiResidential
        )
    }

    /// Price level of the zone relative to second-tier general residential land.
    pub const fn price_multiplier(self) -> f64 {
        match self {
            Self::ExclusiveResidential1 => 0.85,
            Self::ExclusiveResidential2 => 0.90,
            Self::GeneralResidential1 => 0.95,
            Self::GeneralResidential2 => 1.00,
            Self::GeneralResidential3 => 1.08,
            Self::SemiResidential => 1.20,
            Self::CentralCommercial => 1.80,
            Self::GeneralCommercial => 1.60,
            Self::NeighborhoodCommercial => 1.35,
            Self::SemiIndustrial => 0.90,
            Self::GeneralIndustrial => 0.70,
            Self::NaturalGreen => 0.40,
            Self::ProductionGreen => 0.30,
            Self::PlannedManagement => 0.35,
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown zone type '{0}'")]
pub struct UnknownZoneType(pub String);

impl FromStr for ZoneType {
    type Err = UnknownZoneType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed: String = value.split_whitespace().collect();
        let lowered = trimmed.to_ascii_lowercase().replace('-', "_");
        Self::ordered()
            .into_iter()
            .find(|zone| zone.label() == trimmed || zone.identifier() == lowered)
            .ok_or_else(|| UnknownZoneType(value.to_string()))
    }
}

/// Resolved location of the parcel under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
    pub region: String,
    pub district: String,
}

/// A prior land sale used as a reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableTransaction {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub size_sqm: f64,
    pub price_per_sqm: f64,
    pub total_price: f64,
    pub zone_type: ZoneType,
    pub transaction_date: NaiveDate,
    pub distance_km: f64,
    pub days_since_transaction: i64,
}

/// Per-factor fractional adjustments; every value is `<= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFactors {
    pub distance: f64,
    pub time: f64,
    pub size: f64,
    pub zone: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedTransaction {
    pub transaction: ComparableTransaction,
    pub factors: AdjustmentFactors,
    pub adjusted_price_per_sqm: f64,
    pub adjusted_total_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= 0.75 {
            Self::High
        } else if confidence >= 0.50 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePrediction {
    pub low: f64,
    pub avg: f64,
    pub high: f64,
    pub price_per_sqm_avg: f64,
    pub price_per_sqm_low: f64,
    pub price_per_sqm_high: f64,
    pub price_per_sqm_std: f64,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub sample_count: usize,
    pub outliers_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub land_price: f64,
    pub acquisition_tax: f64,
    pub legal_cost: f64,
    pub loan_amount: f64,
    pub interest_cost: f64,
    pub equity_required: f64,
    pub total_cost: f64,
    pub ltv: f64,
    pub annual_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationStrategy {
    pub name: String,
    pub price: f64,
    pub price_per_sqm: f64,
    pub conditions: Vec<String>,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
    Overpriced,
    Underpriced,
    Fair,
}

impl PriceStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 5.0 {
            Self::Overpriced
        } else if percentage < -5.0 {
            Self::Underpriced
        } else {
            Self::Fair
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overpriced => "overpriced",
            Self::Underpriced => "underpriced",
            Self::Fair => "fair",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskingPriceAnalysis {
    pub asking_price: f64,
    pub predicted_price: f64,
    pub difference: f64,
    pub percentage: f64,
    pub status: PriceStatus,
}

impl AskingPriceAnalysis {
    /// Compares an asking price against the predicted average; `None` unless
    /// both prices are positive.
    pub fn compare(asking_price: f64, predicted_price: f64) -> Option<Self> {
        if !(asking_price > 0.0 && predicted_price > 0.0) {
            return None;
        }

        let difference = asking_price - predicted_price;
        let percentage = difference * 100.0 / predicted_price;

        Some(Self {
            asking_price,
            predicted_price,
            difference,
            percentage: round_to(percentage, 2),
            status: PriceStatus::from_percentage(percentage),
        })
    }
}

/// Where the comparables of an evaluation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparableOrigin {
    Synthetic,
    Ingested,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Tolerance on the sum of a weight set.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightConfigError {
    #[error("{component} weight '{name}' must be a non-negative number, got {value}")]
    InvalidWeight {
        component: &'static str,
        name: &'static str,
        value: f64,
    },
    #[error("{component} weights must sum to 1.0 (+/- 0.01), got {sum:.4}")]
    InvalidSum { component: &'static str, sum: f64 },
}

pub(crate) fn validate_weights(
    component: &'static str,
    weights: &[(&'static str, f64)],
) -> Result<(), WeightConfigError> {
    for &(name, value) in weights {
        if !(value.is_finite() && value >= 0.0) {
            return Err(WeightConfigError::InvalidWeight {
                component,
                name,
                value,
            });
        }
    }

    let sum: f64 = weights.iter().map(|(_, value)| value).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(WeightConfigError::InvalidSum { component, sum });
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("invalid {parameter}: {reason}")]
    InvalidInput {
        parameter: &'static str,
        reason: String,
    },
    #[error("invalid configuration: {0}")]
    Configuration(#[from] WeightConfigError),
}

impl ValuationError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter,
            reason: reason.into(),
        }
    }
}
