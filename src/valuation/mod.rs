//! Comparable-sales land valuation.
//!
//! An address is resolved to a district, comparables are drawn around it,
//! normalized toward the target parcel, and aggregated into a price band with
//! a confidence score, an acquisition cost breakdown and negotiation
//! positions. Every stage is a pure function of its inputs plus a PRNG owned
//! by the evaluation.

pub mod adjustment;
pub mod comparables;
pub mod confidence;
pub mod domain;
pub mod financial;
mod geo;
pub mod geocoding;
pub mod negotiation;
mod orchestrator;
pub mod prediction;
mod stats;
pub mod views;

pub use adjustment::{AdjustmentWeights, PriceAdjuster};
pub use comparables::{
    ComparableGenerator, ComparableImportError, ComparableImporter, ComparableQuery,
    ComparableRecord, ComparableSource, IngestedComparables,
};
pub use confidence::{ConfidenceBreakdown, ConfidenceScore, ConfidenceScorer, ConfidenceWeights};
pub use domain::{
    AdjustedTransaction, AdjustmentFactors, AskingPriceAnalysis, ComparableOrigin,
    ComparableTransaction, ConfidenceLevel, Coordinates, FinancialSummary, NegotiationStrategy,
    PricePrediction, PriceStatus, UnknownZoneType, ValuationError, WeightConfigError, ZoneType,
};
pub use financial::{FinancialCalculator, FinancialTerms};
pub use geocoding::GeocodingResolver;
pub use negotiation::NegotiationStrategyGenerator;
pub use orchestrator::{
    ValuationOrchestrator, ValuationRequest, ValuationResult, ValuationSettings, ValuationStage,
};
pub use prediction::PricePredictor;
pub use views::{AdjustmentView, ComparableView};
