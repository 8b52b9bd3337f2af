use super::adjustment::{AdjustmentWeights, PriceAdjuster};
use super::comparables::{ComparableQuery, ComparableSource};
use super::confidence::{ConfidenceBreakdown, ConfidenceScorer, ConfidenceWeights};
use super::domain::{
    AskingPriceAnalysis, ComparableOrigin, Coordinates, FinancialSummary, NegotiationStrategy,
    PricePrediction, ValuationError, ZoneType,
};
use super::financial::{FinancialCalculator, FinancialTerms};
use super::geocoding::GeocodingResolver;
use super::negotiation::NegotiationStrategyGenerator;
use super::prediction::PricePredictor;
use super::views::ComparableView;
use crate::config::ValuationDefaults;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Pipeline stages in execution order. Any failing stage aborts the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationStage {
    Geocoding,
    Generating,
    Adjusting,
    PredictingAndScoring,
    AskingAnalysis,
    FinancialAnalysis,
    Strategies,
    Done,
}

impl ValuationStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Geocoding => "geocoding",
            Self::Generating => "generating",
            Self::Adjusting => "adjusting",
            Self::PredictingAndScoring => "predicting+scoring",
            Self::AskingAnalysis => "asking-analysis",
            Self::FinancialAnalysis => "financial-analysis",
            Self::Strategies => "strategies",
            Self::Done => "done",
        }
    }
}

fn default_contract_months() -> u32 {
    ValuationDefaults::CONTRACT_MONTHS
}

/// Input to a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    pub address: String,
    pub land_size_sqm: f64,
    pub zone_type: ZoneType,
    #[serde(default)]
    pub asking_price: Option<f64>,
    #[serde(default = "default_contract_months")]
    pub contract_months: u32,
    /// Fixes every random draw of the evaluation when present.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Reference date for transaction ages.
    pub as_of: NaiveDate,
}

impl ValuationRequest {
    pub fn new(
        address: impl Into<String>,
        land_size_sqm: f64,
        zone_type: ZoneType,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            address: address.into(),
            land_size_sqm,
            zone_type,
            asking_price: None,
            contract_months: default_contract_months(),
            seed: None,
            as_of,
        }
    }

    pub fn with_asking_price(mut self, asking_price: f64) -> Self {
        self.asking_price = Some(asking_price);
        self
    }

    pub fn with_contract_months(mut self, contract_months: u32) -> Self {
        self.contract_months = contract_months;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ValuationError> {
        if !(self.land_size_sqm.is_finite() && self.land_size_sqm > 0.0) {
            return Err(ValuationError::invalid(
                "land_size_sqm",
                format!("must be positive, got {}", self.land_size_sqm),
            ));
        }
        if let Some(asking) = self.asking_price {
            if !asking.is_finite() {
                return Err(ValuationError::invalid(
                    "asking_price",
                    format!("must be a finite amount, got {asking}"),
                ));
            }
        }
        Ok(())
    }
}

/// Complete appraisal handed to report consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub address: String,
    pub coordinates: Coordinates,
    pub land_size_sqm: f64,
    pub zone_type: ZoneType,
    pub evaluated_on: NaiveDate,
    pub comparable_source: ComparableOrigin,
    pub prediction: PricePrediction,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub asking_analysis: Option<AskingPriceAnalysis>,
    pub comparables: Vec<ComparableView>,
    pub financial: FinancialSummary,
    pub strategies: Vec<NegotiationStrategy>,
}

/// Tunables for the pipeline components.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationSettings {
    pub radius_km: f64,
    pub comparable_count: usize,
    pub adjustment_weights: AdjustmentWeights,
    pub confidence_weights: ConfidenceWeights,
    pub financial_terms: FinancialTerms,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self::from(&ValuationDefaults::default())
    }
}

impl From<&ValuationDefaults> for ValuationSettings {
    fn from(defaults: &ValuationDefaults) -> Self {
        Self {
            radius_km: defaults.radius_km,
            comparable_count: defaults.comparable_count,
            adjustment_weights: AdjustmentWeights::default(),
            confidence_weights: ConfidenceWeights::default(),
            financial_terms: FinancialTerms::default(),
        }
    }
}

/// Runs the valuation pipeline. Holds no per-evaluation state, so one
/// instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ValuationOrchestrator {
    geocoder: GeocodingResolver,
    source: ComparableSource,
    adjuster: PriceAdjuster,
    predictor: PricePredictor,
    financial: FinancialCalculator,
    negotiation: NegotiationStrategyGenerator,
    radius_km: f64,
    comparable_count: usize,
}

impl ValuationOrchestrator {
    pub fn new(
        settings: ValuationSettings,
        source: ComparableSource,
    ) -> Result<Self, ValuationError> {
        if settings.comparable_count < 1 {
            return Err(ValuationError::invalid(
                "count",
                "at least one comparable is required",
            ));
        }
        if !(settings.radius_km.is_finite() && settings.radius_km > 0.0) {
            return Err(ValuationError::invalid(
                "radius_km",
                format!("must be positive, got {}", settings.radius_km),
            ));
        }

        let adjuster = PriceAdjuster::new(settings.adjustment_weights)?;
        let scorer = ConfidenceScorer::new(settings.confidence_weights)?;

        Ok(Self {
            geocoder: GeocodingResolver::new(),
            source,
            adjuster,
            predictor: PricePredictor::new(scorer),
            financial: FinancialCalculator::new(settings.financial_terms),
            negotiation: NegotiationStrategyGenerator::new(),
            radius_km: settings.radius_km,
            comparable_count: settings.comparable_count,
        })
    }

    pub fn comparable_origin(&self) -> ComparableOrigin {
        self.source.origin()
    }

    pub fn evaluate(&self, request: &ValuationRequest) -> Result<ValuationResult, ValuationError> {
        request.validate()?;

        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        enter(ValuationStage::Geocoding);
        let coordinates = self.geocoder.geocode(&request.address, &mut rng);

        enter(ValuationStage::Generating);
        let query = ComparableQuery {
            center: &coordinates,
            target_zone: request.zone_type,
            target_size_sqm: request.land_size_sqm,
            radius_km: self.radius_km,
            count: self.comparable_count,
            as_of: request.as_of,
        };
        let comparables = self.source.comparables(&query, &mut rng)?;

        enter(ValuationStage::Adjusting);
        let adjusted =
            self.adjuster
                .adjust(comparables, request.land_size_sqm, request.zone_type);

        enter(ValuationStage::PredictingAndScoring);
        let (prediction, score) = self.predictor.predict(&adjusted, request.land_size_sqm)?;

        let asking_analysis = match request.asking_price {
            Some(asking) if asking > 0.0 => {
                enter(ValuationStage::AskingAnalysis);
                AskingPriceAnalysis::compare(asking, prediction.avg)
            }
            _ => None,
        };

        enter(ValuationStage::FinancialAnalysis);
        let financial = self
            .financial
            .compute(prediction.avg, request.contract_months)?;

        enter(ValuationStage::Strategies);
        let strategies = self.negotiation.generate(
            prediction.avg,
            &adjusted,
            request.asking_price.filter(|asking| *asking > 0.0),
            request.land_size_sqm,
        );

        enter(ValuationStage::Done);
        info!(
            region = %coordinates.region,
            district = %coordinates.district,
            comparables = adjusted.len(),
            outliers_removed = prediction.outliers_removed,
            predicted = prediction.avg,
            confidence = prediction.confidence,
            "valuation complete"
        );

        Ok(ValuationResult {
            address: request.address.clone(),
            coordinates,
            land_size_sqm: request.land_size_sqm,
            zone_type: request.zone_type,
            evaluated_on: request.as_of,
            comparable_source: self.source.origin(),
            prediction,
            confidence_breakdown: score.breakdown,
            asking_analysis,
            comparables: adjusted.iter().map(ComparableView::from).collect(),
            financial,
            strategies,
        })
    }
}

fn enter(stage: ValuationStage) {
    debug!(stage = stage.label(), "valuation stage");
}
