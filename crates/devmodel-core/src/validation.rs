//! Input bounds and free-text parsing.
//!
//! Every value the UI collaborator hands over passes through here before it can reach a
//! [`ParameterSet`](crate::ParameterSet). Parsing and bounds checking are pure: a failure returns a
//! [`DevModelError`] and leaves the caller's state untouched.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DevModelError;
use crate::types::{Money, Months, Percent};
use crate::DevModelResult;

/// Inclusive range a percentage input must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentRange {
    pub min: Percent,
    pub max: Percent,
}

impl PercentRange {
    pub const fn new(min: Percent, max: Percent) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Percent) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const CONTINGENCY_PCT: PercentRange = PercentRange::new(dec!(0), dec!(20));
pub const LTC_PCT: PercentRange = PercentRange::new(dec!(0), dec!(100));
pub const LENDER_FEE_PCT: PercentRange = PercentRange::new(dec!(0), dec!(10));
pub const ANNUAL_INTEREST_PCT: PercentRange = PercentRange::new(dec!(0), dec!(30));
pub const INVESTOR_ROI_PCT: PercentRange = PercentRange::new(dec!(0), dec!(100));
pub const COMMISSION_PCT: PercentRange = PercentRange::new(dec!(0), dec!(20));

/// Largest accepted monetary input (one quadrillion). Every product and sum the engine forms from
/// inputs at or below this stays inside `Decimal` range.
pub const MAX_MONEY: Money = dec!(1000000000000000);

// ---------------------------------------------------------------------------
// Bounds checks
// ---------------------------------------------------------------------------

/// Monetary inputs must be non-negative and no larger than [`MAX_MONEY`].
pub fn check_money(field: &str, value: Money) -> DevModelResult<Money> {
    if value < Decimal::ZERO {
        return Err(DevModelError::InvalidInput {
            field: field.into(),
            reason: format!("Amount must be non-negative, got {value}"),
        });
    }
    if value > MAX_MONEY {
        return Err(DevModelError::InvalidInput {
            field: field.into(),
            reason: format!("Amount must not exceed {MAX_MONEY}, got {value}"),
        });
    }
    Ok(value)
}

pub fn check_percent(field: &str, value: Percent, range: PercentRange) -> DevModelResult<Percent> {
    if !range.contains(value) {
        return Err(DevModelError::InvalidInput {
            field: field.into(),
            reason: format!(
                "Percentage must be between {} and {}, got {value}",
                range.min, range.max
            ),
        });
    }
    Ok(value)
}

/// Durations are whole months, at least one.
pub fn check_months(field: &str, value: Months) -> DevModelResult<Months> {
    if value < 1 {
        return Err(DevModelError::InvalidInput {
            field: field.into(),
            reason: "Duration must be at least 1 month".into(),
        });
    }
    Ok(value)
}

pub fn check_unit_count(field: &str, value: u32) -> DevModelResult<u32> {
    if value < 1 {
        return Err(DevModelError::InvalidInput {
            field: field.into(),
            reason: "At least one unit must be sold".into(),
        });
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Free-text parsing
// ---------------------------------------------------------------------------

/// Parse user text into a plain decimal, tolerating thousands separators and padding.
pub fn parse_decimal(field: &str, text: &str) -> DevModelResult<Decimal> {
    parse_number(field, text, text.trim())
}

/// Parse and validate a monetary amount, e.g. `"$1,250.50"`. Only a leading `$` is accepted.
pub fn parse_money(field: &str, text: &str) -> DevModelResult<Money> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let value = parse_number(field, text, body)?;
    check_money(field, value)
}

/// Parse and validate a percentage, e.g. `"7.5%"`. Only a trailing `%` is accepted.
pub fn parse_percent(field: &str, text: &str, range: PercentRange) -> DevModelResult<Percent> {
    let trimmed = text.trim();
    let body = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let value = parse_number(field, text, body)?;
    check_percent(field, value, range)
}

fn parse_number(field: &str, text: &str, body: &str) -> DevModelResult<Decimal> {
    let parse_error = || DevModelError::ParseError {
        field: field.into(),
        input: text.into(),
    };

    let cleaned: String = body.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || cleaned.chars().any(char::is_whitespace) {
        return Err(parse_error());
    }
    Decimal::from_str(&cleaned).map_err(|_| parse_error())
}

/// Parse a whole, non-negative count. Fractions such as `"6.5"` are rejected.
pub fn parse_count(field: &str, text: &str) -> DevModelResult<u32> {
    let value = parse_decimal(field, text)?;
    if !value.fract().is_zero() || value < Decimal::ZERO {
        return Err(DevModelError::InvalidInput {
            field: field.into(),
            reason: format!("Expected a whole number, got {value}"),
        });
    }
    value.to_u32().ok_or_else(|| DevModelError::InvalidInput {
        field: field.into(),
        reason: format!("Value {value} is out of range"),
    })
}

pub fn parse_months(field: &str, text: &str) -> DevModelResult<Months> {
    let value = parse_count(field, text)?;
    check_months(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_amount() {
        assert_eq!(parse_money("land_cost", "100000").unwrap(), dec!(100000));
    }

    #[test]
    fn test_parse_formatted_amount() {
        assert_eq!(
            parse_money("land_cost", " $1,250,000.50 ").unwrap(),
            dec!(1250000.50)
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = parse_money("hard_costs", "-5000").unwrap_err();
        assert!(matches!(err, DevModelError::InvalidInput { ref field, .. } if field == "hard_costs"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_money("soft_costs", "twenty grand").unwrap_err();
        assert!(matches!(err, DevModelError::ParseError { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_is_parse_error() {
        assert!(matches!(
            parse_money("soft_costs", "   ").unwrap_err(),
            DevModelError::ParseError { .. }
        ));
    }

    #[test]
    fn test_money_ceiling() {
        assert_eq!(parse_money("land_cost", "1,000,000,000,000,000").unwrap(), MAX_MONEY);
        let err = parse_money("land_cost", "1,000,000,000,000,000.01").unwrap_err();
        assert!(matches!(err, DevModelError::InvalidInput { ref field, .. } if field == "land_cost"));
        assert!(check_money("land_cost", dec!(79000000000000000000000000000)).is_err());
    }

    #[test]
    fn test_symbols_only_where_they_belong() {
        assert!(matches!(
            parse_money("land_cost", "5%").unwrap_err(),
            DevModelError::ParseError { .. }
        ));
        assert!(parse_money("land_cost", "1$2").is_err());
        assert!(parse_money("land_cost", "100$").is_err());
        assert!(parse_percent("commission_pct", "$6", COMMISSION_PCT).is_err());
        assert!(parse_percent("commission_pct", "%6", COMMISSION_PCT).is_err());
        assert_eq!(
            parse_percent("commission_pct", " 6 % ", COMMISSION_PCT).unwrap(),
            dec!(6)
        );
    }

    #[test]
    fn test_percent_bounds() {
        assert_eq!(
            parse_percent("contingency_pct", "7.5%", CONTINGENCY_PCT).unwrap(),
            dec!(7.5)
        );
        assert!(parse_percent("contingency_pct", "20", CONTINGENCY_PCT).is_ok());
        assert!(parse_percent("contingency_pct", "20.01", CONTINGENCY_PCT).is_err());
        assert!(parse_percent("senior_ltc_pct", "-1", LTC_PCT).is_err());
        assert!(parse_percent("senior_annual_interest_pct", "31", ANNUAL_INTEREST_PCT).is_err());
    }

    #[test]
    fn test_months_must_be_whole_and_positive() {
        assert_eq!(parse_months("senior_duration_months", "6").unwrap(), 6);
        assert!(parse_months("senior_duration_months", "0").is_err());
        assert!(parse_months("senior_duration_months", "6.5").is_err());
        assert!(parse_months("senior_duration_months", "-3").is_err());
    }

    #[test]
    fn test_unit_count_zero_rejected() {
        assert!(check_unit_count("unit_count", 0).is_err());
        assert_eq!(check_unit_count("unit_count", 4).unwrap(), 4);
    }
}
