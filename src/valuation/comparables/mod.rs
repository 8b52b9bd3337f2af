//! Comparable transaction sources.
//!
//! An evaluation draws its comparables either from the synthetic generator or
//! from a CSV export ingested up front. Which one is used is fixed when the
//! orchestrator is built.

mod generator;
mod import;

pub use generator::ComparableGenerator;
pub use import::{ComparableImportError, ComparableImporter, ComparableRecord, IngestedComparables};

use super::domain::{ComparableOrigin, ComparableTransaction, Coordinates, ValuationError, ZoneType};
use chrono::NaiveDate;
use rand::RngCore;

/// Everything a source needs to select comparables for one parcel.
#[derive(Debug, Clone)]
pub struct ComparableQuery<'a> {
    pub center: &'a Coordinates,
    pub target_zone: ZoneType,
    pub target_size_sqm: f64,
    pub radius_km: f64,
    pub count: usize,
    pub as_of: NaiveDate,
}

impl ComparableQuery<'_> {
    pub(crate) fn validate(&self) -> Result<(), ValuationError> {
        if self.count < 1 {
            return Err(ValuationError::invalid("count", "at least one comparable is required"));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(ValuationError::invalid(
                "radius_km",
                format!("must be positive, got {}", self.radius_km),
            ));
        }
        if !(self.target_size_sqm.is_finite() && self.target_size_sqm > 0.0) {
            return Err(ValuationError::invalid(
                "land_size_sqm",
                format!("must be positive, got {}", self.target_size_sqm),
            ));
        }
        Ok(())
    }
}

/// Capability selected once at construction time.
#[derive(Debug, Clone)]
pub enum ComparableSource {
    Synthetic(ComparableGenerator),
    Ingested(IngestedComparables),
}

impl Default for ComparableSource {
    fn default() -> Self {
        Self::Synthetic(ComparableGenerator::new())
    }
}

impl ComparableSource {
    pub fn origin(&self) -> ComparableOrigin {
        match self {
            Self::Synthetic(_) => ComparableOrigin::Synthetic,
            Self::Ingested(_) => ComparableOrigin::Ingested,
        }
    }

    /// Comparables for the query, sorted ascending by distance.
    pub fn comparables(
        &self,
        query: &ComparableQuery<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ComparableTransaction>, ValuationError> {
        match self {
            Self::Synthetic(generator) => generator.generate(query, rng),
            Self::Ingested(ingested) => ingested.select(query),
        }
    }
}
