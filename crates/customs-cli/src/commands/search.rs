use clap::Args;
use serde_json::Value;

use customs_core::classification::{search_classifications, DEFAULT_SEARCH_LIMIT};

use super::load_catalog;

/// Arguments for a classification search
#[derive(Args)]
pub struct SearchArgs {
    /// Path to the reference-data snapshot (JSON)
    #[arg(long)]
    pub catalog: String,

    /// Code prefix or description text
    pub query: String,

    /// Maximum number of hits
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,
}

pub fn run_search(args: SearchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog = load_catalog(&args.catalog)?;
    let result = search_classifications(&catalog, &args.query, args.limit)?;
    Ok(serde_json::to_value(result)?)
}
