use napi::Result as NapiResult;
use napi_derive::napi;

use customs_core::calculator::{self, CalculationInput};
use customs_core::classification::{self, DEFAULT_SEARCH_LIMIT};
use customs_core::{CalculatorConfig, InMemoryCatalog};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn load_catalog(catalog_json: &str) -> NapiResult<InMemoryCatalog> {
    InMemoryCatalog::from_json(catalog_json).map_err(to_napi_error)
}

fn load_config(config_json: Option<String>) -> NapiResult<CalculatorConfig> {
    match config_json {
        Some(json) => CalculatorConfig::from_json(&json).map_err(to_napi_error),
        None => Ok(CalculatorConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_customs(
    input_json: String,
    catalog_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: CalculationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let catalog = load_catalog(&catalog_json)?;
    let config = load_config(config_json)?;
    let output =
        calculator::calculate_customs(&catalog, &input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_customs_summary(
    input_json: String,
    catalog_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: CalculationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let catalog = load_catalog(&catalog_json)?;
    let config = load_config(config_json)?;
    let output =
        calculator::calculate_summary(&catalog, &input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[napi]
pub fn search_classifications(
    catalog_json: String,
    query: String,
    limit: Option<u32>,
) -> NapiResult<String> {
    let catalog = load_catalog(&catalog_json)?;
    let limit = limit.map_or(DEFAULT_SEARCH_LIMIT, |l| l as usize);
    let output =
        classification::search_classifications(&catalog, &query, limit).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
