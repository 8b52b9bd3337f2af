use super::domain::{FinancialSummary, ValuationError};
use serde::{Deserialize, Serialize};

/// Financing and transaction-cost assumptions for a land acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialTerms {
    pub ltv: f64,
    pub annual_rate: f64,
    pub acquisition_tax_rate: f64,
    pub legal_cost_rate: f64,
}

impl Default for FinancialTerms {
    fn default() -> Self {
        Self {
            ltv: 0.60,
            annual_rate: 0.0525,
            acquisition_tax_rate: 0.05,
            legal_cost_rate: 0.003,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FinancialCalculator {
    terms: FinancialTerms,
}

impl FinancialCalculator {
    pub fn new(terms: FinancialTerms) -> Self {
        Self { terms }
    }

    /// Cost of buying at `land_price` and carrying the loan for
    /// `contract_months`; zero months means no interest. Amounts are rounded
    /// to whole won.
    pub fn compute(
        &self,
        land_price: f64,
        contract_months: u32,
    ) -> Result<FinancialSummary, ValuationError> {
        if !(land_price.is_finite() && land_price >= 0.0) {
            return Err(ValuationError::invalid(
                "land_price",
                format!("must be a non-negative amount, got {land_price}"),
            ));
        }

        let terms = &self.terms;
        let acquisition_tax = (land_price * terms.acquisition_tax_rate).round();
        let legal_cost = (land_price * terms.legal_cost_rate).round();
        let loan_amount = (land_price * terms.ltv).round();
        let interest_cost =
            (loan_amount * terms.annual_rate * (f64::from(contract_months) / 12.0)).round();

        Ok(FinancialSummary {
            land_price,
            acquisition_tax,
            legal_cost,
            loan_amount,
            interest_cost,
            equity_required: land_price - loan_amount,
            total_cost: land_price + acquisition_tax + legal_cost + interest_cost,
            ltv: terms.ltv,
            annual_rate: terms.annual_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_billion_won_over_six_months() {
        let summary = FinancialCalculator::default()
            .compute(1_000_000_000.0, 6)
            .expect("summary");
        assert_eq!(summary.acquisition_tax, 50_000_000.0);
        assert_eq!(summary.legal_cost, 3_000_000.0);
        assert_eq!(summary.loan_amount, 600_000_000.0);
        assert_eq!(summary.interest_cost, 15_750_000.0);
        assert_eq!(summary.equity_required, 400_000_000.0);
        assert_eq!(summary.total_cost, 1_068_750_000.0);
        assert_eq!(summary.ltv, 0.60);
        assert_eq!(summary.annual_rate, 0.0525);
    }

    #[test]
    fn interest_scales_with_contract_length() {
        let calculator = FinancialCalculator::default();
        let year = calculator.compute(1_000_000_000.0, 12).expect("summary");
        assert_eq!(year.interest_cost, 31_500_000.0);
        assert_eq!(year.total_cost, 1_084_500_000.0);
    }

    #[test]
    fn custom_terms_are_applied() {
        let calculator = FinancialCalculator::new(FinancialTerms {
            ltv: 0.5,
            ..FinancialTerms::default()
        });
        let summary = calculator.compute(800_000_000.0, 6).expect("summary");
        assert_eq!(summary.loan_amount, 400_000_000.0);
        assert_eq!(summary.equity_required, 400_000_000.0);
    }

    #[test]
    fn zero_month_contract_carries_no_interest() {
        let summary = FinancialCalculator::default()
            .compute(1_000_000_000.0, 0)
            .expect("summary");
        assert_eq!(summary.interest_cost, 0.0);
        assert_eq!(summary.loan_amount, 600_000_000.0);
        assert_eq!(summary.total_cost, 1_053_000_000.0);
    }

    #[test]
    fn rejects_negative_land_price() {
        let error = FinancialCalculator::default()
            .compute(-1.0, 6)
            .expect_err("negative price");
        assert!(matches!(
            error,
            ValuationError::InvalidInput {
                parameter: "land_price",
                ..
            }
        ));
    }
}
