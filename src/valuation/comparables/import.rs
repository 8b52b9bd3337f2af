use super::ComparableQuery;
use crate::valuation::domain::{round_to, ComparableTransaction, ValuationError, ZoneType};
use crate::valuation::geo::haversine_km;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ComparableImportError {
    #[error("failed to read comparables export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid comparables CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// A past sale as recorded in an export, before it is related to a parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableRecord {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub size_sqm: f64,
    pub price_per_sqm: f64,
    pub total_price: f64,
    pub zone_type: ZoneType,
    pub transaction_date: NaiveDate,
}

/// Loads comparable sales from a CSV export.
pub struct ComparableImporter;

impl ComparableImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<IngestedComparables, ComparableImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<IngestedComparables, ComparableImportError> {
        let records = parse_records(reader)?;
        info!(records = records.len(), "ingested comparable transactions");
        Ok(IngestedComparables { records })
    }
}

/// Imported sales, related to a parcel on each evaluation.
#[derive(Debug, Clone, Default)]
pub struct IngestedComparables {
    records: Vec<ComparableRecord>,
}

impl IngestedComparables {
    pub fn new(records: Vec<ComparableRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ComparableRecord] {
        &self.records
    }

    /// The `count` nearest sales within the radius that closed on or before `as_of`.
    pub fn select(
        &self,
        query: &ComparableQuery<'_>,
    ) -> Result<Vec<ComparableTransaction>, ValuationError> {
        query.validate()?;

        let center = query.center;
        let mut selected: Vec<ComparableTransaction> = self
            .records
            .iter()
            .filter_map(|record| {
                let distance_km = haversine_km(center.lat, center.lng, record.lat, record.lng);
                let days_since = (query.as_of - record.transaction_date).num_days();
                if distance_km.is_nan() || distance_km > query.radius_km || days_since < 0 {
                    debug!(address = %record.address, distance_km, days_since, "skipping comparable");
                    return None;
                }

                Some(ComparableTransaction {
                    address: record.address.clone(),
                    lat: record.lat,
                    lng: record.lng,
                    size_sqm: record.size_sqm,
                    price_per_sqm: record.price_per_sqm,
                    total_price: record.total_price,
                    zone_type: record.zone_type,
                    transaction_date: record.transaction_date,
                    distance_km: round_to(distance_km, 3),
                    days_since_transaction: days_since,
                })
            })
            .collect();

        if selected.is_empty() {
            return Err(ValuationError::invalid(
                "comparables",
                format!(
                    "no ingested transactions within {} km of the parcel",
                    query.radius_km
                ),
            ));
        }

        selected.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        selected.truncate(query.count);
        Ok(selected)
    }
}

#[derive(Debug, Deserialize)]
struct ComparableRow {
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Latitude")]
    lat: f64,
    #[serde(rename = "Longitude")]
    lng: f64,
    #[serde(rename = "Size (sqm)")]
    size_sqm: f64,
    #[serde(rename = "Price per sqm")]
    price_per_sqm: f64,
    #[serde(
        rename = "Total Price",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    total_price: Option<String>,
    #[serde(rename = "Zone")]
    zone: String,
    #[serde(rename = "Transaction Date")]
    transaction_date: String,
}

fn parse_records<R: Read>(reader: R) -> Result<Vec<ComparableRecord>, ComparableImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<ComparableRow>().enumerate() {
        // header is line 1
        records.push(row?.into_record(index + 2)?);
    }

    Ok(records)
}

impl ComparableRow {
    fn into_record(self, row: usize) -> Result<ComparableRecord, ComparableImportError> {
        let invalid = |reason: String| ComparableImportError::InvalidRow { row, reason };

        if !(self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat)) {
            return Err(invalid(format!("latitude out of range, got {}", self.lat)));
        }
        if !(self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng)) {
            return Err(invalid(format!("longitude out of range, got {}", self.lng)));
        }
        if !(self.size_sqm.is_finite() && self.size_sqm > 0.0) {
            return Err(invalid(format!("size must be positive, got {}", self.size_sqm)));
        }
        if !(self.price_per_sqm.is_finite() && self.price_per_sqm > 0.0) {
            return Err(invalid(format!(
                "price per sqm must be positive, got {}",
                self.price_per_sqm
            )));
        }

        let zone_type = self
            .zone
            .parse::<ZoneType>()
            .map_err(|err| invalid(err.to_string()))?;
        let transaction_date = parse_date(&self.transaction_date)
            .ok_or_else(|| invalid(format!("unrecognized date '{}'", self.transaction_date)))?;
        let total_price = match self.total_price.as_deref() {
            Some(raw) => raw
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| invalid(format!("unrecognized total price '{raw}'")))?,
            None => (self.price_per_sqm * self.size_sqm).round(),
        };

        Ok(ComparableRecord {
            address: self.address,
            lat: self.lat,
            lng: self.lng,
            size_sqm: self.size_sqm,
            price_per_sqm: self.price_per_sqm,
            total_price,
            zone_type,
            transaction_date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::Coordinates;
    use std::io::Cursor;

    const HEADER: &str =
        "Address,Latitude,Longitude,Size (sqm),Price per sqm,Total Price,Zone,Transaction Date\n";

    fn center() -> Coordinates {
        Coordinates {
            lat: 37.5663,
            lng: 126.9019,
            region: "서울특별시".to_string(),
            district: "마포구".to_string(),
        }
    }

    fn query(center: &Coordinates, count: usize) -> ComparableQuery<'_> {
        ComparableQuery {
            center,
            target_zone: ZoneType::GeneralResidential2,
            target_size_sqm: 200.0,
            radius_km: 2.0,
            count,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
        }
    }

    #[test]
    fn parses_rows_and_derives_missing_totals() {
        let csv = format!(
            "{HEADER}서울 마포구 합정동 1-1,37.5500,126.9140,210.5,12000000,,제2종일반주거지역,2025-01-15\n\
             서울 마포구 망원동 2-2,37.5560,126.9050,180,11500000,\"2,070,000,000\",general_residential_3,2024-11-02T09:30:00+09:00\n"
        );
        let ingested = ComparableImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        let records = ingested.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].total_price, 2_526_000_000.0);
        assert_eq!(records[0].zone_type, ZoneType::GeneralResidential2);
        assert_eq!(records[1].total_price, 2_070_000_000.0);
        assert_eq!(
            records[1].transaction_date,
            NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
        );
    }

    #[test]
    fn invalid_rows_report_their_line() {
        let csv = format!(
            "{HEADER}ok,37.55,126.91,100,1000000,,준주거지역,2025-01-01\n\
             bad,37.55,126.91,100,1000000,,lunar_colony,2025-01-01\n"
        );
        let error = ComparableImporter::from_reader(Cursor::new(csv)).expect_err("bad zone");
        match error {
            ComparableImportError::InvalidRow { row, reason } => {
                assert_eq!(row, 3);
                assert!(reason.contains("lunar_colony"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn rows_with_unusable_coordinates_are_rejected() {
        for (lat, lng) in [("NaN", "NaN"), ("91.0", "126.91"), ("37.55", "-180.5"), ("inf", "126.91")] {
            let csv = format!(
                "{HEADER}ok,37.55,126.91,100,1000000,,준주거지역,2025-01-01\n\
                 x,{lat},{lng},100,1000000,,준주거지역,2025-01-01\n"
            );
            let error = ComparableImporter::from_reader(Cursor::new(csv))
                .expect_err("coordinates rejected");
            match error {
                ComparableImportError::InvalidRow { row, reason } => {
                    assert_eq!(row, 3);
                    assert!(reason.contains("itude out of range"), "reason {reason}");
                }
                other => panic!("expected invalid row, got {other:?}"),
            }
        }
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = ComparableImporter::from_path("./does-not-exist.csv").expect_err("io error");
        assert!(matches!(error, ComparableImportError::Io(_)));
    }

    #[test]
    fn selection_filters_radius_and_future_sales() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        let record = |address: &str, lat: f64, lng: f64, sold: NaiveDate| ComparableRecord {
            address: address.to_string(),
            lat,
            lng,
            size_sqm: 200.0,
            price_per_sqm: 10_000_000.0,
            total_price: 2_000_000_000.0,
            zone_type: ZoneType::GeneralResidential2,
            transaction_date: sold,
        };
        let ingested = IngestedComparables::new(vec![
            record("far", 37.70, 126.90, date(2025, 1, 1)),
            record("mid", 37.5750, 126.9019, date(2025, 3, 1)),
            record("near", 37.5680, 126.9019, date(2024, 12, 31)),
            record("future", 37.5665, 126.9019, date(2025, 8, 1)),
            record("unplaced", f64::NAN, f64::NAN, date(2025, 2, 1)),
        ]);

        let center = center();
        let selected = ingested.select(&query(&center, 10)).expect("selection");
        let names: Vec<_> = selected.iter().map(|tx| tx.address.as_str()).collect();
        assert_eq!(names, vec!["near", "mid"]);
        assert_eq!(selected[0].days_since_transaction, 181);

        let selected = ingested.select(&query(&center, 1)).expect("selection");
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn selection_without_nearby_sales_is_an_input_error() {
        let center = center();
        let error = IngestedComparables::default()
            .select(&query(&center, 5))
            .expect_err("nothing to select");
        assert!(matches!(
            error,
            ValuationError::InvalidInput {
                parameter: "comparables",
                ..
            }
        ));
    }
}
