use chrono::{Months as CalendarMonths, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::development::costs::{compute_costs, CostSummary};
use crate::development::investor::{
    capital_from_gap, compute_investor_return, funding_gap, InvestorResult,
};
use crate::development::market::{compute_market_position, MarketPosition};
use crate::development::sales::{compute_profit, compute_sales, CostStack, SalesResult};
use crate::development::senior_loan::{compute_senior_loan, loan_base, SeniorLoanResult};
use crate::error::DevModelError;
use crate::params::{InvestorCapitalMode, ParameterSet};
use crate::types::{with_metadata, ComputationOutput, Milestone, Money, Months, Percent};
use crate::DevModelResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Every derived quantity of a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealResults {
    pub costs: CostSummary,
    pub senior_loan: SeniorLoanResult,
    pub investor: InvestorResult,
    pub sales: SalesResult,
    pub market: MarketPosition,
    /// Line items summed into `total_project_cost`
    pub cost_stack: CostStack,
    /// Full cost stack, including commissions and investor return
    pub total_project_cost: Money,
    /// Land, construction, soft costs and senior financing only
    pub project_investment: Money,
    pub developer_profit: Money,
    pub developer_margin_pct: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<Milestone>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full deal model over a parameter snapshot.
///
/// Pure: the same parameters always produce the same results. Inputs are validated first and
/// nothing out of bounds reaches the formulas.
pub fn compute_deal(params: &ParameterSet) -> DevModelResult<ComputationOutput<DealResults>> {
    let start = Instant::now();
    let (results, warnings) = evaluate_deal(params)?;
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Real Estate Development Pro Forma (cost stack, senior loan, investor capital, sale)",
        params,
        warnings,
        elapsed,
        results,
    ))
}

/// The engine without the output envelope. Returns results and user-facing warnings.
pub fn evaluate_deal(params: &ParameterSet) -> DevModelResult<(DealResults, Vec<String>)> {
    params.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    // --- Costs ---
    let costs = compute_costs(&params.costs);

    // --- Senior loan ---
    let base_amount = loan_base(&params.costs, &costs, params.senior_loan.base_policy);
    let senior_loan = compute_senior_loan(base_amount, &params.senior_loan)?;

    // --- Investor capital ---
    let investor = compute_investor(params, &senior_loan)?;

    // --- Sale and profit ---
    let sales = compute_sales(&params.sale);
    let cost_stack = CostStack {
        land: params.costs.land_cost,
        hard_total: costs.hard_costs_total,
        soft: params.costs.soft_costs,
        senior_fees: senior_loan.fees_total,
        senior_interest: senior_loan.interest_total,
        commission: sales.commission_amount,
        investor_return: investor.return_amount,
    };
    let profit = compute_profit(sales.gross_income, &cost_stack)?;

    // --- Market ---
    let market = compute_market_position(&params.comparables, params.sale.unit_price)?;

    let timeline = params
        .start_date
        .map(|date| build_timeline(date, params))
        .transpose()?;

    let results = DealResults {
        costs,
        senior_loan,
        investor,
        sales,
        market,
        cost_stack,
        total_project_cost: profit.total_project_cost,
        project_investment: profit.project_investment,
        developer_profit: profit.developer_profit,
        developer_margin_pct: profit.developer_margin_pct,
        timeline,
    };

    collect_warnings(params, &results, &mut warnings);
    log::debug!(
        "deal evaluated: gross={} total_cost={} profit={}",
        results.sales.gross_income,
        results.total_project_cost,
        results.developer_profit
    );

    Ok((results, warnings))
}

/// Investor capital the parameters call for, honouring the capital mode.
pub fn resolve_investor_capital(params: &ParameterSet) -> DevModelResult<Money> {
    match params.investor.capital_mode {
        InvestorCapitalMode::Manual => Ok(params.investor.capital_amount),
        InvestorCapitalMode::DerivedFromGap => {
            let costs = compute_costs(&params.costs);
            let base_amount = loan_base(&params.costs, &costs, params.senior_loan.base_policy);
            let senior_loan = compute_senior_loan(base_amount, &params.senior_loan)?;
            Ok(capital_from_gap(
                funding_gap(senior_loan.base_amount, senior_loan.principal),
                params.costs.soft_costs,
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_investor(
    params: &ParameterSet,
    senior_loan: &SeniorLoanResult,
) -> DevModelResult<InvestorResult> {
    let gap = funding_gap(senior_loan.base_amount, senior_loan.principal);
    let gap_capital_required = capital_from_gap(gap, params.costs.soft_costs);

    let capital_amount = match params.investor.capital_mode {
        InvestorCapitalMode::Manual => params.investor.capital_amount,
        InvestorCapitalMode::DerivedFromGap => gap_capital_required,
    };

    let returns = compute_investor_return(
        capital_amount,
        params.investor.roi_pct_annual,
        params.investor.duration_months,
    )?;

    Ok(InvestorResult {
        capital_amount,
        funding_gap: gap,
        gap_capital_required,
        return_amount: returns.return_amount,
        payout_total: returns.payout_total,
    })
}

fn build_timeline(start: NaiveDate, params: &ParameterSet) -> DevModelResult<Vec<Milestone>> {
    let offset = |months: Months, label: &str| -> DevModelResult<Milestone> {
        let date = start
            .checked_add_months(CalendarMonths::new(months))
            .ok_or_else(|| DevModelError::InvalidInput {
                field: "start_date".into(),
                reason: format!("{label} falls outside the supported calendar range"),
            })?;
        Ok(Milestone {
            label: label.into(),
            date,
        })
    };

    let mut milestones = vec![
        Milestone {
            label: "Project start".into(),
            date: start,
        },
        offset(params.senior_loan.duration_months, "Senior loan maturity")?,
        offset(params.investor.duration_months, "Investor payout")?,
    ];
    milestones.sort_by_key(|m| m.date);
    Ok(milestones)
}

fn collect_warnings(params: &ParameterSet, results: &DealResults, warnings: &mut Vec<String>) {
    if results.sales.gross_income.is_zero() {
        warnings.push("Gross income is zero; developer margin reported as 0%".into());
    }

    if results.developer_profit < Decimal::ZERO {
        warnings.push(format!(
            "Developer profit is negative ({}): project is not viable at these assumptions",
            results.developer_profit.round_dp(2)
        ));
    }

    if !results.market.has_comparables {
        warnings.push("No priced comparables; market deviation reported as 0%".into());
    } else if results.market.deviation_pct.abs() > dec!(10) {
        let side = if results.market.is_above_market {
            "above"
        } else {
            "below"
        };
        warnings.push(format!(
            "Unit price is {:.1}% {side} the comparable average; verify pricing",
            results.market.deviation_pct.abs()
        ));
    }

    if params.investor.capital_mode == InvestorCapitalMode::Manual
        && results.investor.capital_amount < results.investor.gap_capital_required
    {
        warnings.push(format!(
            "Investor capital {} does not cover the funding gap plus soft costs ({})",
            results.investor.capital_amount, results.investor.gap_capital_required
        ));
    }

    if params.senior_loan.ltc_pct > dec!(90) {
        warnings.push(format!(
            "Senior LTC of {}% is above 90%; few lenders fund at this leverage",
            params.senior_loan.ltc_pct
        ));
    }

    if results.timeline.is_some()
        && params.senior_loan.duration_months > params.investor.duration_months
    {
        warnings.push("Senior loan matures after the investor is paid out".into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
