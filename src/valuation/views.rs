use super::domain::{AdjustedTransaction, ZoneType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Presentation form of an adjusted comparable for report consumers.
/// Adjusted prices are rounded to whole won here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableView {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub size_sqm: f64,
    pub zone_type: ZoneType,
    pub zone_label: String,
    pub transaction_date: NaiveDate,
    pub distance_km: f64,
    pub days_since_transaction: i64,
    pub price_per_sqm: f64,
    pub total_price: f64,
    pub adjusted_price_per_sqm: f64,
    pub adjusted_total_price: f64,
    pub adjustments: AdjustmentView,
}

/// Adjustment factors rendered as signed percentages, e.g. `-3.00%`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentView {
    pub distance: String,
    pub time: String,
    pub size: String,
    pub zone: String,
    pub total: String,
}

impl From<&AdjustedTransaction> for ComparableView {
    fn from(adjusted: &AdjustedTransaction) -> Self {
        let tx = &adjusted.transaction;
        let factors = &adjusted.factors;
        Self {
            address: tx.address.clone(),
            lat: tx.lat,
            lng: tx.lng,
            size_sqm: tx.size_sqm,
            zone_type: tx.zone_type,
            zone_label: tx.zone_type.label().to_string(),
            transaction_date: tx.transaction_date,
            distance_km: tx.distance_km,
            days_since_transaction: tx.days_since_transaction,
            price_per_sqm: tx.price_per_sqm,
            total_price: tx.total_price,
            adjusted_price_per_sqm: adjusted.adjusted_price_per_sqm.round(),
            adjusted_total_price: adjusted.adjusted_total_price.round(),
            adjustments: AdjustmentView {
                distance: format_percentage(factors.distance),
                time: format_percentage(factors.time),
                size: format_percentage(factors.size),
                zone: format_percentage(factors.zone),
                total: format_percentage(factors.total),
            },
        }
    }
}

pub fn format_percentage(fraction: f64) -> String {
    let percent = fraction * 100.0;
    // avoid rendering "-0.00%"
    if percent.abs() < 0.005 {
        return "0.00%".to_string();
    }
    format!("{percent:.2}%")
}
