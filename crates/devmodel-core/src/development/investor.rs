use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DevModelError;
use crate::types::{Money, Months, Percent};
use crate::DevModelResult;

/// Derived capital is rounded up to a multiple of this amount.
pub const CAPITAL_ROUNDING: Money = dec!(1000);

/// Private money lender / investor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorResult {
    /// Capital actually used in the model (entered or derived)
    pub capital_amount: Money,
    /// Senior loan base not covered by the senior principal
    pub funding_gap: Money,
    /// Capital the gap structure would call for (gap + soft costs, rounded up)
    pub gap_capital_required: Money,
    pub return_amount: Money,
    /// capital_amount + return_amount
    pub payout_total: Money,
}

/// Investor return on a given capital amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorReturn {
    pub return_amount: Money,
    pub payout_total: Money,
}

/// Shortfall between the senior loan base and what the senior lender funds.
pub fn funding_gap(base_amount: Money, principal: Money) -> Money {
    (base_amount - principal).max(Decimal::ZERO)
}

/// Capital needed to cover the gap and soft costs, rounded up to the next thousand.
pub fn capital_from_gap(funding_gap: Money, soft_costs: Money) -> Money {
    let raw = funding_gap + soft_costs;
    (raw / CAPITAL_ROUNDING).ceil() * CAPITAL_ROUNDING
}

/// Return owed to the investor: simple annual ROI pro-rated over the project months.
pub fn compute_investor_return(
    capital_amount: Money,
    roi_pct_annual: Percent,
    duration_months: Months,
) -> DevModelResult<InvestorReturn> {
    if duration_months < 1 {
        return Err(DevModelError::InvalidInput {
            field: "project_duration_months".into(),
            reason: "Project duration must be at least 1 month".into(),
        });
    }
    if capital_amount < Decimal::ZERO {
        return Err(DevModelError::InvalidInput {
            field: "investor_capital".into(),
            reason: "Investor capital must be non-negative".into(),
        });
    }

    let return_amount =
        capital_amount * roi_pct_annual / dec!(100) * Decimal::from(duration_months) / dec!(12);
    Ok(InvestorReturn {
        return_amount,
        payout_total: capital_amount + return_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_investor_return() {
        let out = compute_investor_return(dec!(100000), dec!(12), 12).unwrap();
        assert_eq!(out.return_amount, dec!(12000));
        assert_eq!(out.payout_total, dec!(112000));
    }

    #[test]
    fn test_partial_year_return() {
        let out = compute_investor_return(dec!(100000), dec!(12), 6).unwrap();
        assert_eq!(out.return_amount, dec!(6000));
        assert_eq!(out.payout_total, dec!(106000));
    }

    #[test]
    fn test_capital_from_gap_rounds_up() {
        // gap 38625 + soft 20000 = 58625 -> 59000
        assert_eq!(capital_from_gap(dec!(38625), dec!(20000)), dec!(59000));
    }

    #[test]
    fn test_capital_from_gap_exact_thousand_unchanged() {
        assert_eq!(capital_from_gap(dec!(30000), dec!(20000)), dec!(50000));
    }

    #[test]
    fn test_capital_from_gap_tiny_remainder() {
        assert_eq!(capital_from_gap(dec!(0.01), dec!(0)), dec!(1000));
        assert_eq!(capital_from_gap(dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn test_ceiling_properties() {
        let cases = [
            (dec!(38625), dec!(20000)),
            (dec!(1), dec!(999)),
            (dec!(12345.67), dec!(8901.23)),
            (dec!(0), dec!(1000.5)),
        ];
        for (gap, soft) in cases {
            let capital = capital_from_gap(gap, soft);
            assert!(capital >= gap + soft);
            assert!(capital - (gap + soft) < CAPITAL_ROUNDING);
            assert_eq!(capital % CAPITAL_ROUNDING, Decimal::ZERO);
        }
    }

    #[test]
    fn test_funding_gap() {
        assert_eq!(funding_gap(dec!(257500), dec!(218875)), dec!(38625));
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(compute_investor_return(dec!(100000), dec!(12), 0).is_err());
    }
}
