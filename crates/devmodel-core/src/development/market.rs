use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DevModelError;
use crate::params::Comparable;
use crate::types::{Money, Percent};
use crate::DevModelResult;

/// Label of the subject project's bar in the comparison chart.
pub const SUBJECT_LABEL: &str = "Project";

/// Where the subject's unit price sits against the comparables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPosition {
    pub average_comparable_price: Money,
    /// (subject - average) / average * 100, 0 when there are no priced comparables
    pub deviation_pct: Percent,
    pub is_above_market: bool,
    /// False when every comparable is priced at 0
    pub has_comparables: bool,
    pub bars: Vec<PriceBar>,
}

/// One bar of the market validation chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    pub label: String,
    pub price: Money,
    pub is_subject: bool,
}

pub fn compute_market_position(
    comparables: &[Comparable; 3],
    subject_price: Money,
) -> DevModelResult<MarketPosition> {
    let prices = comparables.clone().map(|c| c.price);
    let average = mean(&prices);
    let has_comparables = !average.is_zero();

    let deviation_pct = if has_comparables {
        (subject_price - average)
            .checked_div(average)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(|| DevModelError::InvalidInput {
                field: "comparables".into(),
                reason: format!("Comparable average {average} is too small to compare against"),
            })?
    } else {
        Decimal::ZERO
    };

    let mut bars: Vec<PriceBar> = comparables
        .iter()
        .map(|c| PriceBar {
            label: c.label.clone(),
            price: c.price,
            is_subject: false,
        })
        .collect();
    bars.push(PriceBar {
        label: SUBJECT_LABEL.into(),
        price: subject_price,
        is_subject: true,
    });

    Ok(MarketPosition {
        average_comparable_price: average,
        deviation_pct,
        is_above_market: deviation_pct > Decimal::ZERO,
        has_comparables,
        bars,
    })
}

fn mean(values: &[Money]) -> Money {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().copied().sum::<Decimal>() / Decimal::from(values.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comps(prices: [Money; 3]) -> [Comparable; 3] {
        let labels = ["Property A", "Property B", "Property C"];
        [0, 1, 2].map(|i| Comparable {
            label: labels[i].into(),
            price: prices[i],
        })
    }

    #[test]
    fn test_subject_above_market() {
        let out = compute_market_position(
            &comps([dec!(420000), dec!(445000), dec!(460000)]),
            dec!(450000),
        )
        .unwrap();
        assert!((out.average_comparable_price - dec!(441666.67)).abs() < dec!(0.01));
        assert!((out.deviation_pct - dec!(1.886792)).abs() < dec!(0.0001));
        assert!(out.is_above_market);
        assert!(out.has_comparables);
    }

    #[test]
    fn test_subject_below_market() {
        let out = compute_market_position(
            &comps([dec!(500000), dec!(500000), dec!(500000)]),
            dec!(450000),
        )
        .unwrap();
        assert_eq!(out.average_comparable_price, dec!(500000));
        assert_eq!(out.deviation_pct, dec!(-10));
        assert!(!out.is_above_market);
    }

    #[test]
    fn test_at_market_is_not_above() {
        let out = compute_market_position(
            &comps([dec!(450000), dec!(450000), dec!(450000)]),
            dec!(450000),
        )
        .unwrap();
        assert_eq!(out.deviation_pct, Decimal::ZERO);
        assert!(!out.is_above_market);
    }

    #[test]
    fn test_zero_comparables_fall_back_to_zero() {
        let out = compute_market_position(&comps([Decimal::ZERO; 3]), dec!(450000)).unwrap();
        assert_eq!(out.average_comparable_price, Decimal::ZERO);
        assert_eq!(out.deviation_pct, Decimal::ZERO);
        assert!(!out.is_above_market);
        assert!(!out.has_comparables);
    }

    #[test]
    fn test_subject_is_fourth_bar() {
        let out = compute_market_position(
            &comps([dec!(420000), dec!(445000), dec!(460000)]),
            dec!(450000),
        )
        .unwrap();
        assert_eq!(out.bars.len(), 4);
        assert_eq!(out.bars[3].label, SUBJECT_LABEL);
        assert!(out.bars[3].is_subject);
        assert_eq!(out.bars[0].label, "Property A");
        assert!(!out.bars[0].is_subject);
    }

    #[test]
    fn test_vanishing_average_is_rejected() {
        let tiny = Decimal::new(1, 28);
        let err = compute_market_position(&comps([tiny, tiny, tiny]), dec!(450000)).unwrap_err();
        assert!(err.is_validation());
    }
}
