use super::domain::{AdjustedTransaction, NegotiationStrategy};

const TOP_COMPARABLES: usize = 3;
const CASH_DISCOUNT: f64 = 0.05;

/// Builds the three opening positions offered to a buyer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegotiationStrategyGenerator;

impl NegotiationStrategyGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        predicted_avg: f64,
        adjusted: &[AdjustedTransaction],
        asking_price: Option<f64>,
        land_size_sqm: f64,
    ) -> Vec<NegotiationStrategy> {
        let per_sqm = |price: f64| {
            if land_size_sqm > 0.0 {
                (price / land_size_sqm).round()
            } else {
                0.0
            }
        };

        let market = NegotiationStrategy {
            name: "Market average".to_string(),
            price: predicted_avg,
            price_per_sqm: per_sqm(predicted_avg),
            conditions: vec![
                "Standard 10% deposit on contract".to_string(),
                "Balance due at registration of title".to_string(),
            ],
            rationale: format!(
                "Anchors on the outlier-filtered average of {} adjusted comparables",
                adjusted.len()
            ),
        };

        let top_unit = top_unit_price(adjusted);
        let top_price = (top_unit * land_size_sqm).round();
        let top = NegotiationStrategy {
            name: "Top-3 average".to_string(),
            price: top_price,
            price_per_sqm: top_unit.round(),
            conditions: vec![
                "Contract signed within 7 days".to_string(),
                "Balance settled within 30 days".to_string(),
            ],
            rationale: "Matches the strongest recent sales nearby in exchange for a fast, certain close"
                .to_string(),
        };

        let third = match asking_price {
            Some(asking) if asking > predicted_avg => {
                let midpoint = ((asking + predicted_avg) / 2.0).round();
                NegotiationStrategy {
                    name: "Midpoint compromise".to_string(),
                    price: midpoint,
                    price_per_sqm: per_sqm(midpoint),
                    conditions: vec![
                        "Seller meets the buyer halfway from the asking price".to_string(),
                        "Standard deposit and settlement schedule".to_string(),
                    ],
                    rationale: format!(
                        "Splits the {:.0} won gap between asking and predicted price so the seller keeps face",
                        asking - predicted_avg
                    ),
                }
            }
            _ => {
                let discounted = (predicted_avg * (1.0 - CASH_DISCOUNT)).round();
                NegotiationStrategy {
                    name: "5% cash discount".to_string(),
                    price: discounted,
                    price_per_sqm: per_sqm(discounted),
                    conditions: vec![
                        "Full payment in cash without financing contingency".to_string(),
                        "Settlement within 14 days".to_string(),
                    ],
                    rationale: "Trades payment certainty for a 5% reduction on the market average"
                        .to_string(),
                }
            }
        };

        vec![market, top, third]
    }
}

/// Mean of the highest adjusted unit prices; fewer than three comparables
/// use all of them.
fn top_unit_price(adjusted: &[AdjustedTransaction]) -> f64 {
    let mut prices: Vec<f64> = adjusted.iter().map(|tx| tx.adjusted_price_per_sqm).collect();
    if prices.is_empty() {
        return 0.0;
    }
    prices.sort_by(|a, b| b.total_cmp(a));
    prices.truncate(TOP_COMPARABLES);
    prices.iter().sum::<f64>() / prices.len() as f64
}
