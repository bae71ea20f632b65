//! The raw, user-adjustable inputs of a development deal.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DevModelError;
use crate::types::{Money, Months, Percent};
use crate::validation::{
    check_money, check_months, check_percent, check_unit_count, parse_count, parse_decimal,
    parse_money, parse_months, parse_percent, PercentRange, ANNUAL_INTEREST_PCT, COMMISSION_PCT,
    CONTINGENCY_PCT, INVESTOR_ROI_PCT, LENDER_FEE_PCT, LTC_PCT,
};
use crate::DevModelResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which project costs the senior lender sizes its loan against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanBasePolicy {
    /// Land + hard costs + contingency
    #[default]
    LandPlusHardTotal,
    /// Hard costs (before contingency) + soft costs
    HardPlusSoft,
}

/// Where the investor (gap lender) capital figure comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorCapitalMode {
    /// The stored `capital_amount` is used as entered
    #[default]
    Manual,
    /// Capital covers the senior loan shortfall plus soft costs, rounded up to the next 1,000
    DerivedFromGap,
}

/// Land and construction budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCosts {
    pub land_cost: Money,
    /// Direct construction costs, before contingency
    pub hard_costs: Money,
    pub soft_costs: Money,
    /// Reserve on hard costs (0-20)
    pub contingency_pct: Percent,
}

/// Hard-money (senior) lender terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorLoanTerms {
    /// Loan-to-cost against the policy's base amount (0-100)
    pub ltc_pct: Percent,
    /// Origination points (0-10)
    pub origination_pct: Percent,
    /// Other lender / mortgage expenses (0-10)
    pub other_fee_pct: Percent,
    /// Simple annual interest (0-30)
    pub annual_interest_pct: Percent,
    /// Loan term, independent of the project duration
    pub duration_months: Months,
    #[serde(default)]
    pub base_policy: LoanBasePolicy,
}

/// Private money lender / investor terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorTerms {
    pub capital_amount: Money,
    /// Annual return offered (0-100)
    pub roi_pct_annual: Percent,
    /// Project duration the investor is paid over
    pub duration_months: Months,
    #[serde(default)]
    pub capital_mode: InvestorCapitalMode,
}

/// Exit assumptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAssumptions {
    pub unit_price: Money,
    pub unit_count: u32,
    /// Realtor commission plus closing costs (0-20)
    pub commission_pct: Percent,
}

/// A market reference sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparable {
    pub label: String,
    pub price: Money,
}

/// Complete input snapshot for one deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub costs: ProjectCosts,
    pub senior_loan: SeniorLoanTerms,
    pub investor: InvestorTerms,
    pub sale: SaleAssumptions,
    pub comparables: [Comparable; 3],
    /// Optional project start, used only for the milestone timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            costs: ProjectCosts {
                land_cost: dec!(100000),
                hard_costs: dec!(150000),
                soft_costs: dec!(20000),
                contingency_pct: dec!(5),
            },
            senior_loan: SeniorLoanTerms {
                ltc_pct: dec!(85),
                origination_pct: dec!(1.5),
                other_fee_pct: dec!(2.0),
                annual_interest_pct: dec!(10),
                duration_months: 6,
                base_policy: LoanBasePolicy::default(),
            },
            investor: InvestorTerms {
                capital_amount: dec!(100000),
                roi_pct_annual: dec!(12),
                duration_months: 12,
                capital_mode: InvestorCapitalMode::default(),
            },
            sale: SaleAssumptions {
                unit_price: dec!(450000),
                unit_count: 1,
                commission_pct: dec!(6),
            },
            comparables: [
                Comparable {
                    label: "Property A".into(),
                    price: dec!(420000),
                },
                Comparable {
                    label: "Property B".into(),
                    price: dec!(445000),
                },
                Comparable {
                    label: "Property C".into(),
                    price: dec!(460000),
                },
            ],
            start_date: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A single editable parameter, addressable by its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LandCost,
    HardCosts,
    SoftCosts,
    ContingencyPct,
    SeniorLtcPct,
    SeniorOriginationPct,
    SeniorOtherFeePct,
    SeniorAnnualInterestPct,
    SeniorDurationMonths,
    UnitPrice,
    UnitCount,
    CommissionPct,
    InvestorCapital,
    InvestorRoiPct,
    ProjectDurationMonths,
    /// Comparable label, index 0-2
    ComparableLabel(usize),
    /// Comparable price, index 0-2
    ComparablePrice(usize),
}

impl Field {
    pub const NUMERIC: [Field; 18] = [
        Field::LandCost,
        Field::HardCosts,
        Field::SoftCosts,
        Field::ContingencyPct,
        Field::SeniorLtcPct,
        Field::SeniorOriginationPct,
        Field::SeniorOtherFeePct,
        Field::SeniorAnnualInterestPct,
        Field::SeniorDurationMonths,
        Field::UnitPrice,
        Field::UnitCount,
        Field::CommissionPct,
        Field::InvestorCapital,
        Field::InvestorRoiPct,
        Field::ProjectDurationMonths,
        Field::ComparablePrice(0),
        Field::ComparablePrice(1),
        Field::ComparablePrice(2),
    ];

    pub fn name(&self) -> String {
        match self {
            Field::LandCost => "land_cost".into(),
            Field::HardCosts => "hard_costs".into(),
            Field::SoftCosts => "soft_costs".into(),
            Field::ContingencyPct => "contingency_pct".into(),
            Field::SeniorLtcPct => "senior_ltc_pct".into(),
            Field::SeniorOriginationPct => "senior_origination_pct".into(),
            Field::SeniorOtherFeePct => "senior_other_fee_pct".into(),
            Field::SeniorAnnualInterestPct => "senior_annual_interest_pct".into(),
            Field::SeniorDurationMonths => "senior_duration_months".into(),
            Field::UnitPrice => "unit_price".into(),
            Field::UnitCount => "unit_count".into(),
            Field::CommissionPct => "commission_pct".into(),
            Field::InvestorCapital => "investor_capital".into(),
            Field::InvestorRoiPct => "investor_roi_pct".into(),
            Field::ProjectDurationMonths => "project_duration_months".into(),
            Field::ComparableLabel(i) => format!("comp_{}_label", i + 1),
            Field::ComparablePrice(i) => format!("comp_{}_price", i + 1),
        }
    }

    /// Bounds for percentage fields, `None` for everything else.
    pub fn percent_range(&self) -> Option<PercentRange> {
        match self {
            Field::ContingencyPct => Some(CONTINGENCY_PCT),
            Field::SeniorLtcPct => Some(LTC_PCT),
            Field::SeniorOriginationPct | Field::SeniorOtherFeePct => Some(LENDER_FEE_PCT),
            Field::SeniorAnnualInterestPct => Some(ANNUAL_INTEREST_PCT),
            Field::InvestorRoiPct => Some(INVESTOR_ROI_PCT),
            Field::CommissionPct => Some(COMMISSION_PCT),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Field {
    type Err = DevModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let field = match key.as_str() {
            "land_cost" => Field::LandCost,
            "hard_costs" => Field::HardCosts,
            "soft_costs" => Field::SoftCosts,
            "contingency_pct" => Field::ContingencyPct,
            "senior_ltc_pct" => Field::SeniorLtcPct,
            "senior_origination_pct" => Field::SeniorOriginationPct,
            "senior_other_fee_pct" => Field::SeniorOtherFeePct,
            "senior_annual_interest_pct" => Field::SeniorAnnualInterestPct,
            "senior_duration_months" => Field::SeniorDurationMonths,
            "unit_price" => Field::UnitPrice,
            "unit_count" => Field::UnitCount,
            "commission_pct" => Field::CommissionPct,
            "investor_capital" => Field::InvestorCapital,
            "investor_roi_pct" => Field::InvestorRoiPct,
            "project_duration_months" => Field::ProjectDurationMonths,
            other => return parse_comparable_field(other),
        };
        Ok(field)
    }
}

fn parse_comparable_field(key: &str) -> DevModelResult<Field> {
    let unknown = || DevModelError::UnknownField(key.to_string());
    let rest = key.strip_prefix("comp_").ok_or_else(unknown)?;
    let (index, attr) = rest.split_once('_').ok_or_else(unknown)?;
    let index: usize = index.parse().map_err(|_| unknown())?;
    if !(1..=3).contains(&index) {
        return Err(unknown());
    }
    match attr {
        "label" | "name" => Ok(Field::ComparableLabel(index - 1)),
        "price" => Ok(Field::ComparablePrice(index - 1)),
        _ => Err(unknown()),
    }
}

// ---------------------------------------------------------------------------
// Validation and typed mutation
// ---------------------------------------------------------------------------

impl ParameterSet {
    /// Check every field against its declared bound.
    pub fn validate(&self) -> DevModelResult<()> {
        for field in Field::NUMERIC {
            self.check_field(field, self.get(field)?)?;
        }
        Ok(())
    }

    /// Reject edits to a field whose value is derived rather than entered.
    ///
    /// In gap mode the investor capital is recomputed from costs and loan terms, so a typed value
    /// would be silently discarded.
    pub fn ensure_editable(&self, field: Field) -> DevModelResult<()> {
        if field == Field::InvestorCapital
            && self.investor.capital_mode == InvestorCapitalMode::DerivedFromGap
        {
            return Err(DevModelError::InvalidInput {
                field: field.name(),
                reason: "Investor capital is derived from the funding gap; switch to manual mode to enter it"
                    .into(),
            });
        }
        Ok(())
    }

    /// Current numeric value of a field.
    pub fn get(&self, field: Field) -> DevModelResult<Decimal> {
        let value = match field {
            Field::LandCost => self.costs.land_cost,
            Field::HardCosts => self.costs.hard_costs,
            Field::SoftCosts => self.costs.soft_costs,
            Field::ContingencyPct => self.costs.contingency_pct,
            Field::SeniorLtcPct => self.senior_loan.ltc_pct,
            Field::SeniorOriginationPct => self.senior_loan.origination_pct,
            Field::SeniorOtherFeePct => self.senior_loan.other_fee_pct,
            Field::SeniorAnnualInterestPct => self.senior_loan.annual_interest_pct,
            Field::SeniorDurationMonths => Decimal::from(self.senior_loan.duration_months),
            Field::UnitPrice => self.sale.unit_price,
            Field::UnitCount => Decimal::from(self.sale.unit_count),
            Field::CommissionPct => self.sale.commission_pct,
            Field::InvestorCapital => self.investor.capital_amount,
            Field::InvestorRoiPct => self.investor.roi_pct_annual,
            Field::ProjectDurationMonths => Decimal::from(self.investor.duration_months),
            Field::ComparablePrice(i) => self.comparable(field, i)?.price,
            Field::ComparableLabel(_) => {
                return Err(DevModelError::InvalidInput {
                    field: field.name(),
                    reason: "Comparable labels are not numeric".into(),
                })
            }
        };
        Ok(value)
    }

    /// Set a numeric field. Out-of-bound values are rejected and the prior value is kept.
    pub fn set(&mut self, field: Field, value: Decimal) -> DevModelResult<()> {
        let value = self.check_field(field, value)?;
        match field {
            Field::LandCost => self.costs.land_cost = value,
            Field::HardCosts => self.costs.hard_costs = value,
            Field::SoftCosts => self.costs.soft_costs = value,
            Field::ContingencyPct => self.costs.contingency_pct = value,
            Field::SeniorLtcPct => self.senior_loan.ltc_pct = value,
            Field::SeniorOriginationPct => self.senior_loan.origination_pct = value,
            Field::SeniorOtherFeePct => self.senior_loan.other_fee_pct = value,
            Field::SeniorAnnualInterestPct => self.senior_loan.annual_interest_pct = value,
            Field::SeniorDurationMonths => {
                self.senior_loan.duration_months = whole_number(field, value)?
            }
            Field::UnitPrice => self.sale.unit_price = value,
            Field::UnitCount => self.sale.unit_count = whole_number(field, value)?,
            Field::CommissionPct => self.sale.commission_pct = value,
            Field::InvestorCapital => self.investor.capital_amount = value,
            Field::InvestorRoiPct => self.investor.roi_pct_annual = value,
            Field::ProjectDurationMonths => {
                self.investor.duration_months = whole_number(field, value)?
            }
            Field::ComparablePrice(i) => {
                self.comparable(field, i)?;
                self.comparables[i].price = value;
            }
            Field::ComparableLabel(_) => {
                return Err(DevModelError::InvalidInput {
                    field: field.name(),
                    reason: "Comparable labels are text; use set_from_text".into(),
                })
            }
        }
        Ok(())
    }

    /// Parse free text for a field and apply it. Labels are taken verbatim.
    pub fn set_from_text(&mut self, field: Field, text: &str) -> DevModelResult<()> {
        if let Field::ComparableLabel(i) = field {
            self.comparable(field, i)?;
            self.comparables[i].label = text.trim().to_string();
            return Ok(());
        }
        let name = field.name();
        let value = match field {
            Field::SeniorDurationMonths | Field::ProjectDurationMonths => {
                Decimal::from(parse_months(&name, text)?)
            }
            Field::UnitCount => Decimal::from(check_unit_count(&name, parse_count(&name, text)?)?),
            _ => match field.percent_range() {
                Some(range) => parse_percent(&name, text, range)?,
                None if is_money(field) => parse_money(&name, text)?,
                None => parse_decimal(&name, text)?,
            },
        };
        self.set(field, value)
    }

    fn check_field(&self, field: Field, value: Decimal) -> DevModelResult<Decimal> {
        let name = field.name();
        if let Some(range) = field.percent_range() {
            return check_percent(&name, value, range);
        }
        match field {
            Field::SeniorDurationMonths | Field::ProjectDurationMonths => {
                check_months(&name, whole_number(field, value)?)?;
                Ok(value)
            }
            Field::UnitCount => {
                check_unit_count(&name, whole_number(field, value)?)?;
                Ok(value)
            }
            Field::ComparableLabel(_) => Err(DevModelError::InvalidInput {
                field: name,
                reason: "Comparable labels are text; use set_from_text".into(),
            }),
            _ => check_money(&name, value),
        }
    }

    fn comparable(&self, field: Field, index: usize) -> DevModelResult<&Comparable> {
        self.comparables
            .get(index)
            .ok_or_else(|| DevModelError::UnknownField(field.name()))
    }
}

fn is_money(field: Field) -> bool {
    matches!(
        field,
        Field::LandCost
            | Field::HardCosts
            | Field::SoftCosts
            | Field::UnitPrice
            | Field::InvestorCapital
            | Field::ComparablePrice(_)
    )
}

/// Whole, non-negative integer view of a decimal count field.
fn whole_number(field: Field, value: Decimal) -> DevModelResult<u32> {
    use rust_decimal::prelude::ToPrimitive;

    if !value.fract().is_zero() || value < Decimal::ZERO {
        return Err(DevModelError::InvalidInput {
            field: field.name(),
            reason: format!("Expected a whole number, got {value}"),
        });
    }
    value.to_u32().ok_or_else(|| DevModelError::InvalidInput {
        field: field.name(),
        reason: format!("Value {value} is out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ParameterSet::default().validate().is_ok());
    }

    #[test]
    fn test_default_snapshot_values() {
        let p = ParameterSet::default();
        assert_eq!(p.costs.land_cost, dec!(100000));
        assert_eq!(p.senior_loan.ltc_pct, dec!(85));
        assert_eq!(p.senior_loan.duration_months, 6);
        assert_eq!(p.investor.duration_months, 12);
        assert_eq!(p.comparables[1].label, "Property B");
        assert_eq!(p.comparables[2].price, dec!(460000));
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::NUMERIC {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
        assert_eq!(
            "comp_2_label".parse::<Field>().unwrap(),
            Field::ComparableLabel(1)
        );
    }

    #[test]
    fn test_unknown_field() {
        assert!(matches!(
            "comp_4_price".parse::<Field>(),
            Err(DevModelError::UnknownField(_))
        ));
        assert!(matches!(
            "parking_spaces".parse::<Field>(),
            Err(DevModelError::UnknownField(_))
        ));
    }

    #[test]
    fn test_rejected_set_keeps_prior_value() {
        let mut p = ParameterSet::default();
        let before = p.clone();
        assert!(p.set_from_text(Field::HardCosts, "-5000").is_err());
        assert!(p.set(Field::ContingencyPct, dec!(25)).is_err());
        assert!(p.set(Field::SeniorDurationMonths, dec!(0)).is_err());
        assert!(p.set(Field::UnitCount, dec!(1.5)).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_set_from_text_applies() {
        let mut p = ParameterSet::default();
        p.set_from_text(Field::HardCosts, "$175,000").unwrap();
        p.set_from_text(Field::UnitCount, "3").unwrap();
        p.set_from_text(Field::ComparableLabel(0), "  12 Elm St ").unwrap();
        assert_eq!(p.costs.hard_costs, dec!(175000));
        assert_eq!(p.sale.unit_count, 3);
        assert_eq!(p.comparables[0].label, "12 Elm St");
    }

    #[test]
    fn test_validate_catches_deserialized_out_of_bounds() {
        let mut p = ParameterSet::default();
        p.senior_loan.annual_interest_pct = dec!(45);
        assert!(matches!(
            p.validate(),
            Err(DevModelError::InvalidInput { ref field, .. }) if field == "senior_annual_interest_pct"
        ));
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&InvestorCapitalMode::DerivedFromGap).unwrap();
        assert_eq!(json, "\"derived_from_gap\"");
        let policy: LoanBasePolicy = serde_json::from_str("\"hard_plus_soft\"").unwrap();
        assert_eq!(policy, LoanBasePolicy::HardPlusSoft);
    }
}
