use clap::{Args, ValueEnum};
use serde_json::Value;

use devmodel_core::development::waterfall::{build_cost_breakdown, build_waterfall};
use devmodel_core::params::{Field, InvestorCapitalMode, LoanBasePolicy, ParameterSet};
use devmodel_core::{ComputationOutput, DealSession};
use devmodel_core::development::deal::DealResults;

use crate::input;

/// Arguments shared by every deal command
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DealArgs {
    /// Path to a JSON or YAML parameter file (defaults apply when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Edit a parameter, e.g. --set hard_costs=175,000 (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub edits: Vec<String>,

    /// Cost figure the senior lender applies its LTC to
    #[arg(long)]
    pub loan_base: Option<LoanBaseArg>,

    /// Where investor capital comes from
    #[arg(long)]
    pub capital_mode: Option<CapitalModeArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LoanBaseArg {
    LandPlusHardTotal,
    HardPlusSoft,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CapitalModeArg {
    Manual,
    DerivedFromGap,
}

impl From<LoanBaseArg> for LoanBasePolicy {
    fn from(arg: LoanBaseArg) -> Self {
        match arg {
            LoanBaseArg::LandPlusHardTotal => LoanBasePolicy::LandPlusHardTotal,
            LoanBaseArg::HardPlusSoft => LoanBasePolicy::HardPlusSoft,
        }
    }
}

impl From<CapitalModeArg> for InvestorCapitalMode {
    fn from(arg: CapitalModeArg) -> Self {
        match arg {
            CapitalModeArg::Manual => InvestorCapitalMode::Manual,
            CapitalModeArg::DerivedFromGap => InvestorCapitalMode::DerivedFromGap,
        }
    }
}

pub fn run_deal(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = build_session(args)?;
    Ok(serde_json::to_value(session.results())?)
}

pub fn run_waterfall(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = build_session(args)?;
    let steps = build_waterfall(&session.results().result);
    Ok(serde_json::to_value(reshape(session.results(), steps))?)
}

pub fn run_breakdown(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = build_session(args)?;
    let slices = build_cost_breakdown(&session.results().result);
    Ok(serde_json::to_value(reshape(session.results(), slices))?)
}

pub fn run_market(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = build_session(args)?;
    let market = session.results().result.market.clone();
    Ok(serde_json::to_value(reshape(session.results(), market))?)
}

pub fn run_defaults() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(ParameterSet::default())?)
}

/// Load parameters, apply policy flags and `--set` edits through a session.
fn build_session(args: DealArgs) -> Result<DealSession, Box<dyn std::error::Error>> {
    let params = load_params(args.input.as_deref())?;
    let mut session = DealSession::with_params(params)?;

    if let Some(policy) = args.loan_base {
        session.set_loan_base_policy(policy.into())?;
    }
    if let Some(mode) = args.capital_mode {
        session.set_capital_mode(mode.into())?;
    }
    for edit in &args.edits {
        let (name, text) = edit
            .split_once('=')
            .ok_or_else(|| format!("Expected FIELD=VALUE, got '{edit}'"))?;
        let field: Field = name.parse()?;
        session.edit(field, text)?;
    }
    Ok(session)
}

pub fn load_params(path: Option<&str>) -> Result<ParameterSet, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_params(path)
    } else if let Some(params) = input::stdin::read_stdin_params()? {
        Ok(params)
    } else {
        Ok(ParameterSet::default())
    }
}

/// Keep the envelope (warnings, metadata) around a projected result.
fn reshape<T: serde::Serialize>(
    source: &ComputationOutput<DealResults>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: source.methodology.clone(),
        assumptions: source.assumptions.clone(),
        warnings: source.warnings.clone(),
        metadata: source.metadata.clone(),
    }
}
