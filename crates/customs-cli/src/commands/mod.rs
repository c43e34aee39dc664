pub mod calculate;
pub mod regime;
pub mod search;

use std::path::Path;

use customs_core::{CalculatorConfig, InMemoryCatalog};
use tracing::debug;

use crate::input;

/// Load the calculator configuration, or the defaults when no file is given.
/// Files ending in `.yaml`/`.yml` are read as YAML, anything else as JSON.
pub fn load_config(path: Option<&str>) -> Result<CalculatorConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(CalculatorConfig::default());
    };

    let contents = input::file::read_text(path)?;
    let is_yaml = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let config: CalculatorConfig = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path, e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path, e))?
    };
    config.validate()?;
    debug!(path, local_currency = %config.local_currency, "configuration loaded");
    Ok(config)
}

/// Load a reference-data snapshot.
pub fn load_catalog(path: &str) -> Result<InMemoryCatalog, Box<dyn std::error::Error>> {
    let contents = input::file::read_text(path)?;
    let catalog = InMemoryCatalog::from_json(&contents)
        .map_err(|e| format!("Failed to load catalog '{}': {}", path, e))?;
    Ok(catalog)
}
