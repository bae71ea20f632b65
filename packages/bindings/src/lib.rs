use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;

use devmodel_core::development::{deal, waterfall};
use devmodel_core::params::{Field, ParameterSet};
use devmodel_core::session;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_params(params_json: &str) -> NapiResult<ParameterSet> {
    serde_json::from_str(params_json).map_err(to_napi_error)
}

fn to_json(value: &impl Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// The default snapshot, for "reset to defaults".
#[napi]
pub fn default_parameters() -> NapiResult<String> {
    to_json(&ParameterSet::default())
}

/// Apply one free-text edit and return the updated parameter set.
///
/// A rejected edit throws; the caller keeps its previous parameters.
#[napi]
pub fn apply_edit(params_json: String, field: String, text: String) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let field: Field = field.parse().map_err(to_napi_error)?;
    let updated = session::apply_edit(&params, field, &text).map_err(to_napi_error)?;
    to_json(&updated)
}

/// Parse and validate a money string such as "$1,250.50". Returns the decimal as a string.
#[napi]
pub fn parse_money(field: String, text: String) -> NapiResult<String> {
    let value: Decimal =
        devmodel_core::validation::parse_money(&field, &text).map_err(to_napi_error)?;
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_deal(params_json: String) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let output = deal::compute_deal(&params).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn deal_waterfall(params_json: String) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let (results, _) = deal::evaluate_deal(&params).map_err(to_napi_error)?;
    to_json(&waterfall::build_waterfall(&results))
}

#[napi]
pub fn cost_breakdown(params_json: String) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let (results, _) = deal::evaluate_deal(&params).map_err(to_napi_error)?;
    to_json(&waterfall::build_cost_breakdown(&results))
}

#[napi]
pub fn market_position(params_json: String) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let (results, _) = deal::evaluate_deal(&params).map_err(to_napi_error)?;
    to_json(&results.market)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn deal_sensitivity(input_json: String) -> NapiResult<String> {
    let input: devmodel_core::sensitivity::DealSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = devmodel_core::sensitivity::deal_sensitivity(&input).map_err(to_napi_error)?;
    to_json(&output)
}
