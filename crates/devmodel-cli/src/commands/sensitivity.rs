use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use devmodel_core::sensitivity::{self, DealSensitivityInput, OutputMetric};
use devmodel_core::SensitivityVariable;

use crate::commands::deal::load_params;
use crate::input;

/// Arguments for a two-way deal sensitivity
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON grid definition (base parameters, both variables, metric)
    #[arg(long)]
    pub grid: Option<String>,

    /// Base parameter file (JSON or YAML) used with the sweep flags
    #[arg(long)]
    pub input: Option<String>,

    /// First sweep as FIELD:MIN:MAX:STEP, e.g. unit_price:400000:500000:25000
    #[arg(long)]
    pub sweep_1: Option<String>,

    /// Second sweep as FIELD:MIN:MAX:STEP
    #[arg(long)]
    pub sweep_2: Option<String>,

    /// Metric reported in each cell
    #[arg(long, default_value = "developer_profit")]
    pub metric: String,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: DealSensitivityInput = if let Some(ref path) = args.grid {
        input::file::read_json(path)?
    } else {
        DealSensitivityInput {
            base: load_params(args.input.as_deref())?,
            variable_1: parse_sweep(
                args.sweep_1
                    .as_deref()
                    .ok_or("--sweep-1 is required (or provide --grid)")?,
            )?,
            variable_2: parse_sweep(
                args.sweep_2
                    .as_deref()
                    .ok_or("--sweep-2 is required (or provide --grid)")?,
            )?,
            output_metric: serde_json::from_value::<OutputMetric>(Value::String(
                args.metric.clone(),
            ))
            .map_err(|_| format!("Unknown metric '{}'", args.metric))?,
        }
    };
    let result = sensitivity::deal_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_sweep(text: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 4 {
        return Err(format!("Expected FIELD:MIN:MAX:STEP, got '{text}'").into());
    }
    let number = |s: &str| -> Result<Decimal, Box<dyn std::error::Error>> {
        Ok(s.trim().replace(',', "").parse::<Decimal>()?)
    };
    Ok(SensitivityVariable {
        name: parts[0].trim().to_string(),
        min: number(parts[1])?,
        max: number(parts[2])?,
        step: number(parts[3])?,
    })
}
