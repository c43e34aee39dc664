use clap::Args;
use serde_json::{json, Value};

use customs_core::catalog::ReferenceCatalog;
use customs_core::regime::classify_regime;

use super::{load_catalog, load_config};

/// Arguments for a duty regime lookup
#[derive(Args)]
pub struct RegimeArgs {
    /// Path to the reference-data snapshot (JSON)
    #[arg(long)]
    pub catalog: String,

    /// Country of origin (ISO alpha-2; XX when unknown)
    #[arg(long)]
    pub origin: String,

    /// An origin certificate is held
    #[arg(long)]
    pub certificate: bool,
}

pub fn run_regime(
    args: RegimeArgs,
    config_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let catalog = load_catalog(&args.catalog)?;

    let regime = classify_regime(&catalog, &config, &args.origin, args.certificate);
    let origin = args.origin.trim().to_ascii_uppercase();

    Ok(json!({
        "result": {
            "origin_country": origin,
            "has_certificate": args.certificate,
            "regime": regime.value,
            "free_trade_partner": catalog.is_free_trade(&origin),
            "preferential_partner": config.is_preferential_partner(&origin),
        },
        "warnings": regime.warnings,
    }))
}
