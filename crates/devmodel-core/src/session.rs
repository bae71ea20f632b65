//! Owner of the one live parameter set of a user session.
//!
//! All mutation goes through typed edits that enforce input bounds. An accepted edit re-runs the
//! engine; a rejected edit leaves the stored parameters exactly as they were.

use rust_decimal::Decimal;

use crate::development::deal::{compute_deal, resolve_investor_capital, DealResults};
use crate::params::{Field, InvestorCapitalMode, LoanBasePolicy, ParameterSet};
use crate::types::ComputationOutput;
use crate::DevModelResult;

#[derive(Debug, Clone)]
pub struct DealSession {
    params: ParameterSet,
    latest: ComputationOutput<DealResults>,
}

impl DealSession {
    /// Start a session from the default snapshot.
    pub fn new() -> DevModelResult<Self> {
        Self::with_params(ParameterSet::default())
    }

    /// Start from a caller-supplied snapshot, which must pass validation.
    pub fn with_params(params: ParameterSet) -> DevModelResult<Self> {
        let mut params = params;
        refresh_derived(&mut params)?;
        let latest = compute_deal(&params)?;
        Ok(Self { params, latest })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Output of the most recent successful recompute.
    pub fn results(&self) -> &ComputationOutput<DealResults> {
        &self.latest
    }

    /// Apply a free-text edit, as typed into a form field.
    pub fn edit(&mut self, field: Field, text: &str) -> DevModelResult<&ComputationOutput<DealResults>> {
        self.apply(field, |candidate| {
            candidate.ensure_editable(field)?;
            candidate.set_from_text(field, text)
        })
    }

    /// Apply an already-numeric edit.
    pub fn set(&mut self, field: Field, value: Decimal) -> DevModelResult<&ComputationOutput<DealResults>> {
        self.apply(field, |candidate| {
            candidate.ensure_editable(field)?;
            candidate.set(field, value)
        })
    }

    pub fn set_loan_base_policy(
        &mut self,
        policy: LoanBasePolicy,
    ) -> DevModelResult<&ComputationOutput<DealResults>> {
        self.replace(|candidate| {
            candidate.senior_loan.base_policy = policy;
            Ok(())
        })
    }

    pub fn set_capital_mode(
        &mut self,
        mode: InvestorCapitalMode,
    ) -> DevModelResult<&ComputationOutput<DealResults>> {
        self.replace(|candidate| {
            candidate.investor.capital_mode = mode;
            Ok(())
        })
    }

    /// Replace the whole parameter set with the default snapshot.
    pub fn reset(&mut self) -> DevModelResult<&ComputationOutput<DealResults>> {
        self.replace(|candidate| {
            *candidate = ParameterSet::default();
            Ok(())
        })
    }

    fn apply<F>(&mut self, field: Field, mutate: F) -> DevModelResult<&ComputationOutput<DealResults>>
    where
        F: FnOnce(&mut ParameterSet) -> DevModelResult<()>,
    {
        self.replace(mutate).inspect_err(|e| {
            log::warn!("rejected edit to {field}: {e}");
        })
    }

    /// Mutate a copy, recompute, and commit only if both succeed.
    fn replace<F>(&mut self, mutate: F) -> DevModelResult<&ComputationOutput<DealResults>>
    where
        F: FnOnce(&mut ParameterSet) -> DevModelResult<()>,
    {
        let mut candidate = self.params.clone();
        mutate(&mut candidate)?;
        refresh_derived(&mut candidate)?;
        let latest = compute_deal(&candidate)?;

        self.params = candidate;
        self.latest = latest;
        Ok(&self.latest)
    }
}

/// Apply one free-text edit to a detached parameter set, for callers that keep their own copy.
///
/// Returns the updated set; the input is never modified.
pub fn apply_edit(params: &ParameterSet, field: Field, text: &str) -> DevModelResult<ParameterSet> {
    params.ensure_editable(field)?;
    let mut candidate = params.clone();
    candidate.set_from_text(field, text)?;
    refresh_derived(&mut candidate)?;
    Ok(candidate)
}

/// In gap mode the stored capital always mirrors the current costs and loan terms.
fn refresh_derived(params: &mut ParameterSet) -> DevModelResult<()> {
    if params.investor.capital_mode == InvestorCapitalMode::DerivedFromGap {
        params.validate()?;
        params.investor.capital_amount = resolve_investor_capital(params)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevModelError;
    use crate::validation::MAX_MONEY;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_session_has_results() {
        let session = DealSession::new().unwrap();
        assert_eq!(session.results().result.developer_profit, dec!(114895.625));
    }

    #[test]
    fn test_edit_recomputes() {
        let mut session = DealSession::new().unwrap();
        let out = session.edit(Field::UnitCount, "2").unwrap();
        assert_eq!(out.result.sales.gross_income, dec!(900000));
        assert_eq!(session.params().sale.unit_count, 2);
    }

    #[test]
    fn test_rejected_edit_retains_prior_value() {
        let mut session = DealSession::new().unwrap();
        let before = session.params().clone();
        let before_profit = session.results().result.developer_profit;

        let err = session.edit(Field::HardCosts, "-5000").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.params(), &before);
        assert_eq!(session.results().result.developer_profit, before_profit);
    }

    #[test]
    fn test_unparseable_edit_rejected() {
        let mut session = DealSession::new().unwrap();
        assert!(session.edit(Field::LandCost, "lots").is_err());
        assert_eq!(session.params().costs.land_cost, dec!(100000));
    }

    #[test]
    fn test_derived_capital_tracks_upstream_edits() {
        let mut session = DealSession::new().unwrap();
        session
            .set_capital_mode(InvestorCapitalMode::DerivedFromGap)
            .unwrap();
        assert_eq!(session.params().investor.capital_amount, dec!(59000));

        // base 100000 + 200000 + 10000 = 310000; principal 263500; gap 46500 + 20000 -> 67000
        session.edit(Field::HardCosts, "200,000").unwrap();
        assert_eq!(session.params().investor.capital_amount, dec!(67000));
        assert_eq!(session.results().result.investor.capital_amount, dec!(67000));

        // gap unchanged; soft 30000 -> 46500 + 30000 = 76500 -> 77000
        session.edit(Field::SoftCosts, "30000").unwrap();
        assert_eq!(session.params().investor.capital_amount, dec!(77000));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = DealSession::new().unwrap();
        session.edit(Field::LandCost, "250000").unwrap();
        session.set_loan_base_policy(LoanBasePolicy::HardPlusSoft).unwrap();
        session.reset().unwrap();
        assert_eq!(session.params(), &ParameterSet::default());
    }

    #[test]
    fn test_detached_apply_edit() {
        let mut params = ParameterSet::default();
        params.investor.capital_mode = InvestorCapitalMode::DerivedFromGap;
        let updated = apply_edit(&params, Field::SoftCosts, "30,000").unwrap();
        assert_eq!(updated.costs.soft_costs, dec!(30000));
        // gap 38625 + 30000 = 68625 -> 69000
        assert_eq!(updated.investor.capital_amount, dec!(69000));
        assert_eq!(params.costs.soft_costs, dec!(20000));
        assert!(apply_edit(&params, Field::SoftCosts, "-1").is_err());
    }

    #[test]
    fn test_derived_capital_cannot_be_typed_over() {
        let mut session = DealSession::new().unwrap();
        session
            .set_capital_mode(InvestorCapitalMode::DerivedFromGap)
            .unwrap();
        let before = session.params().clone();

        let err = session.edit(Field::InvestorCapital, "150000").unwrap_err();
        assert!(err.is_validation());
        assert!(session.set(Field::InvestorCapital, dec!(150000)).is_err());
        assert_eq!(session.params(), &before);
        assert!(apply_edit(&before, Field::InvestorCapital, "150000").is_err());

        session.set_capital_mode(InvestorCapitalMode::Manual).unwrap();
        session.edit(Field::InvestorCapital, "150000").unwrap();
        assert_eq!(session.params().investor.capital_amount, dec!(150000));
    }

    #[test]
    fn test_oversized_amount_rejected_without_panic() {
        let mut session = DealSession::new().unwrap();
        let before = session.params().clone();

        let err = session
            .edit(Field::LandCost, "79,000,000,000,000,000,000,000,000,000")
            .unwrap_err();
        assert!(matches!(err, DevModelError::InvalidInput { ref field, .. } if field == "land_cost"));
        assert_eq!(session.params(), &before);

        assert!(session.edit(Field::UnitPrice, "1,000,000,000,000,000.01").is_err());
        assert_eq!(session.params(), &before);
    }

    #[test]
    fn test_amounts_at_ceiling_evaluate() {
        let mut session = DealSession::new().unwrap();
        for field in [
            Field::LandCost,
            Field::HardCosts,
            Field::SoftCosts,
            Field::UnitPrice,
            Field::InvestorCapital,
            Field::ComparablePrice(0),
        ] {
            session.set(field, MAX_MONEY).unwrap();
        }
        session.edit(Field::UnitCount, "4294967295").unwrap();
        session.edit(Field::SeniorDurationMonths, "4294967295").unwrap();
        session.edit(Field::ProjectDurationMonths, "4294967295").unwrap();
        session.edit(Field::ContingencyPct, "20").unwrap();
        session.edit(Field::SeniorAnnualInterestPct, "30").unwrap();
        session.edit(Field::InvestorRoiPct, "100").unwrap();
        session.edit(Field::CommissionPct, "20").unwrap();

        assert_eq!(session.params().costs.land_cost, MAX_MONEY);
        assert!(session.results().result.sales.gross_income > MAX_MONEY);
    }

    #[test]
    fn test_invalid_initial_params_rejected() {
        let mut params = ParameterSet::default();
        params.sale.unit_count = 0;
        assert!(DealSession::with_params(params).is_err());
    }
}
