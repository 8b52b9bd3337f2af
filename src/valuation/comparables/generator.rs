use super::ComparableQuery;
use crate::valuation::domain::{round_to, ComparableTransaction, ValuationError, ZoneType};
use crate::valuation::geo::offset_km;
use crate::valuation::geocoding::district_profile;
use chrono::Duration;
use rand::Rng;
use std::f64::consts::TAU;

/// Used when the center does not come from the district table.
const FALLBACK_BASE_PRICE_PER_SQM: f64 = 3_000_000.0;

const DISTANCE_DISCOUNT_AT_EDGE: f64 = 0.15;
const TIME_DECAY_PER_TWO_YEARS: f64 = 0.12;
const TIME_DECAY_HORIZON_DAYS: f64 = 730.0;
const MIN_DAYS_AGO: i64 = 30;
const MAX_DAYS_AGO: i64 = 720;
const SAME_ZONE_PROBABILITY: f64 = 0.7;

/// Synthesizes plausible nearby sales around a resolved parcel.
#[derive(Debug, Clone, Default)]
pub struct ComparableGenerator;

impl ComparableGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Draws `query.count` comparables uniformly over the search disk.
    ///
    /// All randomness comes from `rng`; a seeded generator yields identical
    /// output for identical queries.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        query: &ComparableQuery<'_>,
        rng: &mut R,
    ) -> Result<Vec<ComparableTransaction>, ValuationError> {
        query.validate()?;

        let center = query.center;
        let profile = district_profile(&center.region, &center.district);
        let base_price = profile
            .map(|entry| entry.base_price_per_sqm)
            .unwrap_or(FALLBACK_BASE_PRICE_PER_SQM);
        let alternates: Vec<ZoneType> = ZoneType::ordered()
            .into_iter()
            .filter(|zone| *zone != query.target_zone)
            .collect();

        let mut transactions = Vec::with_capacity(query.count);
        for index in 0..query.count {
            // sqrt keeps the density uniform over area rather than radius
            let distance = query.radius_km * rng.gen::<f64>().sqrt();
            let angle = rng.gen_range(0.0..TAU);
            let (lat, lng) = offset_km(
                center.lat,
                center.lng,
                distance * angle.cos(),
                distance * angle.sin(),
            );

            let zone_type = if rng.gen_bool(SAME_ZONE_PROBABILITY) {
                query.target_zone
            } else {
                alternates[rng.gen_range(0..alternates.len())]
            };

            let days_ago = rng.gen_range(MIN_DAYS_AGO..=MAX_DAYS_AGO);
            let size_sqm = round_to(query.target_size_sqm * rng.gen_range(0.5..=1.5), 1);
            let noise = rng.gen_range(0.90..=1.10);

            let distance_factor = 1.0 - (distance / query.radius_km) * DISTANCE_DISCOUNT_AT_EDGE;
            let time_factor =
                1.0 - (days_ago as f64 / TIME_DECAY_HORIZON_DAYS) * TIME_DECAY_PER_TWO_YEARS;
            let size_factor = lot_size_factor(size_sqm / query.target_size_sqm);

            let price_per_sqm = (base_price
                * zone_type.price_multiplier()
                * distance_factor
                * time_factor
                * size_factor
                * noise)
                .round();

            let address = match profile {
                Some(entry) => {
                    let hood = entry.neighborhoods[rng.gen_range(0..entry.neighborhoods.len())];
                    format!(
                        "{} {} {} {}-{}",
                        center.region,
                        center.district,
                        hood,
                        rng.gen_range(1..=999),
                        rng.gen_range(1..=99)
                    )
                }
                None => format!("{} {} 인근 필지 {}", center.region, center.district, index + 1),
            };

            transactions.push(ComparableTransaction {
                address,
                lat,
                lng,
                size_sqm,
                price_per_sqm,
                total_price: (price_per_sqm * size_sqm).round(),
                zone_type,
                transaction_date: query.as_of - Duration::days(days_ago),
                distance_km: round_to(distance, 3),
                days_since_transaction: days_ago,
            });
        }

        transactions.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(transactions)
    }
}

/// Small lots trade at a premium per sqm, large lots at a bulk discount.
fn lot_size_factor(ratio: f64) -> f64 {
    if ratio < 0.7 {
        1.05
    } else if ratio > 1.3 {
        0.95
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::Coordinates;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn center() -> Coordinates {
        Coordinates {
            lat: 37.5172,
            lng: 127.0473,
            region: "서울특별시".to_string(),
            district: "강남구".to_string(),
        }
    }

    fn query(center: &Coordinates, count: usize) -> ComparableQuery<'_> {
        ComparableQuery {
            center,
            target_zone: ZoneType::GeneralResidential2,
            target_size_sqm: 330.0,
            radius_km: 2.0,
            count,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
        }
    }

    fn generate(seed: u64, count: usize) -> Vec<ComparableTransaction> {
        let center = center();
        let mut rng = StdRng::seed_from_u64(seed);
        ComparableGenerator::new()
            .generate(&query(&center, count), &mut rng)
            .expect("generation succeeds")
    }

    #[test]
    fn same_seed_produces_identical_sequences() {
        let first = serde_json::to_string(&generate(42, 20)).expect("serialize");
        let second = serde_json::to_string(&generate(42, 20)).expect("serialize");
        assert_eq!(first, second);
        assert_ne!(generate(42, 20), generate(43, 20));
    }

    #[test]
    fn comparables_respect_sampling_bounds() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date");
        let transactions = generate(7, 200);
        assert_eq!(transactions.len(), 200);

        for tx in &transactions {
            assert!(tx.distance_km >= 0.0 && tx.distance_km <= 2.0);
            assert!((30..=720).contains(&tx.days_since_transaction));
            assert_eq!(
                as_of - tx.transaction_date,
                Duration::days(tx.days_since_transaction)
            );
            assert!(tx.size_sqm >= 165.0 && tx.size_sqm <= 495.0);
            assert!(tx.price_per_sqm > 0.0);
            assert!(tx.address.starts_with("서울특별시 강남구"));
        }

        assert!(transactions
            .windows(2)
            .all(|pair| pair[0].distance_km <= pair[1].distance_km));
    }

    #[test]
    fn most_comparables_share_the_target_zone() {
        let transactions = generate(11, 500);
        let same = transactions
            .iter()
            .filter(|tx| tx.zone_type == ZoneType::GeneralResidential2)
            .count();
        // 70% expected; allow generous sampling slack
        assert!((300..=400).contains(&same), "same-zone count {same}");
    }

    #[test]
    fn area_uniform_sampling_puts_most_points_in_outer_ring() {
        let transactions = generate(5, 1000);
        let inner = transactions
            .iter()
            .filter(|tx| tx.distance_km < 1.0)
            .count();
        // a disk of half the radius holds a quarter of the area
        assert!((180..=320).contains(&inner), "inner count {inner}");
    }

    #[test]
    fn rejects_invalid_queries() {
        let center = center();
        let mut rng = StdRng::seed_from_u64(1);
        let generator = ComparableGenerator::new();

        let error = generator
            .generate(&query(&center, 0), &mut rng)
            .expect_err("zero count rejected");
        assert!(matches!(
            error,
            ValuationError::InvalidInput {
                parameter: "count",
                ..
            }
        ));

        let mut zero_radius = query(&center, 5);
        zero_radius.radius_km = 0.0;
        let error = generator
            .generate(&zero_radius, &mut rng)
            .expect_err("zero radius rejected");
        assert!(matches!(
            error,
            ValuationError::InvalidInput {
                parameter: "radius_km",
                ..
            }
        ));
    }

    #[test]
    fn lot_size_factor_tiers() {
        assert_eq!(lot_size_factor(0.6), 1.05);
        assert_eq!(lot_size_factor(0.7), 1.0);
        assert_eq!(lot_size_factor(1.3), 1.0);
        assert_eq!(lot_size_factor(1.31), 0.95);
    }
}
