use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::development::costs::CostSummary;
use crate::error::DevModelError;
use crate::params::{LoanBasePolicy, ProjectCosts, SeniorLoanTerms};
use crate::types::Money;
use crate::DevModelResult;

/// Senior (hard-money) loan sizing and carrying cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorLoanResult {
    /// Cost figure the LTC is applied to, per the configured policy
    pub base_amount: Money,
    pub principal: Money,
    pub origination_amount: Money,
    pub other_fee_amount: Money,
    pub fees_total: Money,
    /// Simple interest over the loan's own term
    pub interest_total: Money,
    /// principal + fees + interest owed at payoff
    pub total_repayment: Money,
}

/// Resolve the loan base for the configured policy.
pub fn loan_base(costs: &ProjectCosts, summary: &CostSummary, policy: LoanBasePolicy) -> Money {
    match policy {
        LoanBasePolicy::LandPlusHardTotal => costs.land_cost + summary.hard_costs_total,
        LoanBasePolicy::HardPlusSoft => costs.hard_costs + costs.soft_costs,
    }
}

/// Size the senior loan and its fees and interest.
///
/// Interest is simple (non-compounding), pro-rated by `duration_months / 12`.
pub fn compute_senior_loan(
    base_amount: Money,
    terms: &SeniorLoanTerms,
) -> DevModelResult<SeniorLoanResult> {
    if terms.duration_months < 1 {
        return Err(DevModelError::InvalidInput {
            field: "senior_duration_months".into(),
            reason: "Loan duration must be at least 1 month".into(),
        });
    }

    let principal = base_amount * terms.ltc_pct / dec!(100);
    let origination_amount = principal * terms.origination_pct / dec!(100);
    let other_fee_amount = principal * terms.other_fee_pct / dec!(100);
    let fees_total = origination_amount + other_fee_amount;
    let interest_total = principal * terms.annual_interest_pct / dec!(100)
        * Decimal::from(terms.duration_months)
        / dec!(12);

    Ok(SeniorLoanResult {
        base_amount,
        principal,
        origination_amount,
        other_fee_amount,
        fees_total,
        interest_total,
        total_repayment: principal + fees_total + interest_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::development::costs::compute_costs;

    fn sample_terms() -> SeniorLoanTerms {
        SeniorLoanTerms {
            ltc_pct: dec!(85),
            origination_pct: dec!(1.5),
            other_fee_pct: dec!(2.0),
            annual_interest_pct: dec!(10),
            duration_months: 6,
            base_policy: LoanBasePolicy::LandPlusHardTotal,
        }
    }

    fn sample_costs() -> ProjectCosts {
        ProjectCosts {
            land_cost: dec!(100000),
            hard_costs: dec!(150000),
            soft_costs: dec!(20000),
            contingency_pct: dec!(5),
        }
    }

    #[test]
    fn test_land_plus_hard_total_base() {
        let costs = sample_costs();
        let summary = compute_costs(&costs);
        assert_eq!(
            loan_base(&costs, &summary, LoanBasePolicy::LandPlusHardTotal),
            dec!(257500)
        );
    }

    #[test]
    fn test_hard_plus_soft_base_ignores_contingency() {
        let costs = sample_costs();
        let summary = compute_costs(&costs);
        assert_eq!(
            loan_base(&costs, &summary, LoanBasePolicy::HardPlusSoft),
            dec!(170000)
        );
    }

    #[test]
    fn test_default_loan() {
        let out = compute_senior_loan(dec!(257500), &sample_terms()).unwrap();
        assert_eq!(out.principal, dec!(218875));
        assert_eq!(out.origination_amount, dec!(3283.125));
        assert_eq!(out.other_fee_amount, dec!(4377.5));
        assert_eq!(out.fees_total, dec!(7660.625));
        assert_eq!(out.interest_total, dec!(10943.75));
        assert_eq!(out.total_repayment, dec!(237479.375));
    }

    #[test]
    fn test_interest_scales_with_loan_term() {
        let mut terms = sample_terms();
        terms.duration_months = 12;
        let out = compute_senior_loan(dec!(257500), &terms).unwrap();
        assert_eq!(out.interest_total, dec!(21887.5));
    }

    #[test]
    fn test_zero_ltc_means_no_loan() {
        let mut terms = sample_terms();
        terms.ltc_pct = dec!(0);
        let out = compute_senior_loan(dec!(257500), &terms).unwrap();
        assert_eq!(out.principal, Decimal::ZERO);
        assert_eq!(out.fees_total, Decimal::ZERO);
        assert_eq!(out.interest_total, Decimal::ZERO);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut terms = sample_terms();
        terms.duration_months = 0;
        let err = compute_senior_loan(dec!(257500), &terms).unwrap_err();
        assert!(err.is_validation());
    }
}
