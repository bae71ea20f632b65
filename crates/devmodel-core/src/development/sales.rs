use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DevModelError;
use crate::params::SaleAssumptions;
use crate::types::{Money, Percent};
use crate::DevModelResult;

/// Exit revenue and selling costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesResult {
    /// unit_price * unit_count
    pub gross_income: Money,
    /// Realtor commission and closing costs
    pub commission_amount: Money,
    /// gross_income - commission_amount
    pub net_sales_proceeds: Money,
}

/// Every outflow charged against gross income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostStack {
    pub land: Money,
    pub hard_total: Money,
    pub soft: Money,
    pub senior_fees: Money,
    pub senior_interest: Money,
    pub commission: Money,
    pub investor_return: Money,
}

impl CostStack {
    /// Land, construction, soft costs and senior financing: what is sunk before the sale.
    pub fn project_investment(&self) -> Money {
        self.land + self.hard_total + self.soft + self.senior_fees + self.senior_interest
    }

    /// The full cost stack. Every line item is included.
    pub fn total(&self) -> Money {
        self.project_investment() + self.commission + self.investor_return
    }
}

/// Bottom line of the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitResult {
    pub total_project_cost: Money,
    pub project_investment: Money,
    /// May be negative: the project is not viable
    pub developer_profit: Money,
    /// Profit as a percentage of gross income, 0 when there is no income
    pub developer_margin_pct: Percent,
}

pub fn compute_sales(sale: &SaleAssumptions) -> SalesResult {
    let gross_income = sale.unit_price * Decimal::from(sale.unit_count);
    let commission_amount = gross_income * sale.commission_pct / dec!(100);
    SalesResult {
        gross_income,
        commission_amount,
        net_sales_proceeds: gross_income - commission_amount,
    }
}

/// Fails only when the margin ratio leaves `Decimal` range, e.g. a near-zero sale price.
pub fn compute_profit(gross_income: Money, stack: &CostStack) -> DevModelResult<ProfitResult> {
    let total_project_cost = stack.total();
    let developer_profit = gross_income - total_project_cost;
    let developer_margin_pct = if gross_income.is_zero() {
        Decimal::ZERO
    } else {
        developer_profit
            .checked_div(gross_income)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(|| DevModelError::InvalidInput {
                field: "unit_price".into(),
                reason: format!("Gross income {gross_income} is too small to express a margin"),
            })?
    };

    Ok(ProfitResult {
        total_project_cost,
        project_investment: stack.project_investment(),
        developer_profit,
        developer_margin_pct,
    })
}
