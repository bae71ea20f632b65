//! What-if grids: sweep two parameters and watch one deal metric.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::development::deal::{evaluate_deal, DealResults};
use crate::error::DevModelError;
use crate::params::{Field, ParameterSet};
use crate::types::*;
use crate::DevModelResult;

/// Upper bound on sweep points per variable.
pub const MAX_SWEEP_POINTS: usize = 101;

/// Deal metric reported in each grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMetric {
    #[default]
    DeveloperProfit,
    DeveloperMarginPct,
    TotalProjectCost,
    InvestorPayoutTotal,
}

impl OutputMetric {
    pub fn extract(&self, deal: &DealResults) -> Decimal {
        match self {
            OutputMetric::DeveloperProfit => deal.developer_profit,
            OutputMetric::DeveloperMarginPct => deal.developer_margin_pct,
            OutputMetric::TotalProjectCost => deal.total_project_cost,
            OutputMetric::InvestorPayoutTotal => deal.investor.payout_total,
        }
    }
}

/// Input for a 2-way deal sensitivity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealSensitivityInput {
    /// Base case parameters; swept fields are overridden per cell
    #[serde(default)]
    pub base: ParameterSet,
    /// First variable to sweep, named by parameter field (e.g. "unit_price")
    pub variable_1: SensitivityVariable,
    /// Second variable to sweep
    pub variable_2: SensitivityVariable,
    #[serde(default)]
    pub output_metric: OutputMetric,
}

/// Output of a 2-way deal sensitivity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: OutputMetric,
    /// Matrix[i][j] = output when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    /// Metric at the unmodified base parameters
    pub base_case_value: Decimal,
    /// Grid cell closest to the base parameters (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> DevModelResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(DevModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(DevModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let too_many = || DevModelError::InvalidInput {
        field: format!("variable:{}", var.name),
        reason: format!("Sweep exceeds {MAX_SWEEP_POINTS} points; widen the step"),
    };

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(too_many());
        }
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            if values.len() == MAX_SWEEP_POINTS {
                return Err(too_many());
            }
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Evaluate the deal at every combination of the two swept parameters.
///
/// Every sweep point is checked against the field's input bounds before any evaluation runs, so
/// a grid never mixes valid and rejected cells.
pub fn deal_sensitivity(
    input: &DealSensitivityInput,
) -> DevModelResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let field_1: Field = input.variable_1.name.parse()?;
    let field_2: Field = input.variable_2.name.parse()?;
    if field_1 == field_2 {
        return Err(DevModelError::InvalidInput {
            field: "variable_2".into(),
            reason: "Sensitivity variables must be different parameters".into(),
        });
    }

    input.base.ensure_editable(field_1)?;
    input.base.ensure_editable(field_2)?;

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    // Reject out-of-bound sweep points up front
    let mut bounds_check = input.base.clone();
    for v in &v1_values {
        bounds_check.set(field_1, *v)?;
    }
    for v in &v2_values {
        bounds_check.set(field_2, *v)?;
    }

    let (base_deal, base_warnings) = evaluate_deal(&input.base)?;
    warnings.extend(base_warnings);
    let base_case_value = input.output_metric.extract(&base_deal);

    let mut matrix = Vec::with_capacity(v1_values.len());
    let mut unviable = 0usize;
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let mut scenario = input.base.clone();
            scenario.set(field_1, *v1)?;
            scenario.set(field_2, *v2)?;
            let (deal, _) = evaluate_deal(&scenario)?;
            if deal.developer_profit < Decimal::ZERO {
                unviable += 1;
            }
            row.push(input.output_metric.extract(&deal));
        }
        matrix.push(row);
    }

    if unviable > 0 {
        warnings.push(format!(
            "{unviable} of {} scenarios produce a negative developer profit",
            v1_values.len() * v2_values.len()
        ));
    }

    let base_row = closest_index(&v1_values, input.base.get(field_1)?);
    let base_col = closest_index(&v2_values, input.base.get(field_2)?);

    let output = SensitivityOutput {
        variable_1_name: field_1.name(),
        variable_2_name: field_2.name(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Deal Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1,
            "variable_2": input.variable_2,
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
