use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::params::ProjectCosts;
use crate::types::Money;

/// Contingency reserve and the hard-cost budget it inflates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    /// hard_costs * contingency_pct / 100
    pub contingency_amount: Money,
    /// hard_costs + contingency_amount
    pub hard_costs_total: Money,
}

/// Apply the contingency reserve to hard costs. No rounding.
pub fn compute_costs(costs: &ProjectCosts) -> CostSummary {
    let contingency_amount = costs.hard_costs * costs.contingency_pct / dec!(100);
    CostSummary {
        contingency_amount,
        hard_costs_total: costs.hard_costs + contingency_amount,
    }
}
