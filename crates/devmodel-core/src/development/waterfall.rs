//! Chart-ready projections of a computed deal.
//!
//! Neither function computes anything new: both reshape [`DealResults`] for a waterfall and a
//! cost-structure pie.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::development::deal::DealResults;
use crate::types::{Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Revenue,
    Cost,
    Total,
}

/// One signed step of the profit waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    /// Positive for revenue, negative for costs, the residual for the total
    pub amount: Money,
    /// Cumulative position after this step
    pub running_total: Money,
    pub kind: StepKind,
}

/// One wedge of the cost-structure breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownSlice {
    pub label: String,
    pub amount: Money,
    /// Share of the sum of all slices
    pub share_pct: Percent,
}

/// Gross income, then each cost in the order it is incurred, then developer profit.
pub fn build_waterfall(deal: &DealResults) -> Vec<WaterfallStep> {
    let gross = deal.sales.gross_income;
    let mut steps = vec![WaterfallStep {
        label: "Gross sales".into(),
        amount: gross,
        running_total: gross,
        kind: StepKind::Revenue,
    }];

    let mut running = gross;
    for (label, cost) in cost_lines(deal) {
        running -= cost;
        steps.push(WaterfallStep {
            label: label.into(),
            amount: -cost,
            running_total: running,
            kind: StepKind::Cost,
        });
    }

    steps.push(WaterfallStep {
        label: "Developer profit".into(),
        amount: deal.developer_profit,
        running_total: deal.developer_profit,
        kind: StepKind::Total,
    });
    steps
}

/// Cost structure with developer profit floored at zero.
pub fn build_cost_breakdown(deal: &DealResults) -> Vec<BreakdownSlice> {
    let mut wedges: Vec<(&str, Money)> = cost_lines(deal).to_vec();
    wedges.push(("Developer profit", deal.developer_profit.max(Decimal::ZERO)));

    let total: Money = wedges.iter().map(|(_, amount)| *amount).sum();
    wedges
        .into_iter()
        .map(|(label, amount)| BreakdownSlice {
            label: label.into(),
            amount,
            share_pct: if total.is_zero() {
                Decimal::ZERO
            } else {
                amount / total * dec!(100)
            },
        })
        .collect()
}

fn cost_lines(deal: &DealResults) -> [(&'static str, Money); 7] {
    [
        ("Land", deal.cost_stack.land),
        ("Hard costs + contingency", deal.cost_stack.hard_total),
        ("Soft costs", deal.cost_stack.soft),
        ("Senior loan fees", deal.cost_stack.senior_fees),
        ("Senior loan interest", deal.cost_stack.senior_interest),
        ("Sales commissions", deal.cost_stack.commission),
        ("Investor return", deal.cost_stack.investor_return),
    ]
}
