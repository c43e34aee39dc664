use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use customs_core::calculator::{self, CalculationInput};

use crate::input;

use super::{load_catalog, load_config};

/// Arguments for a customs calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to the reference-data snapshot (JSON)
    #[arg(long)]
    pub catalog: String,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Classification code (2 to 10 digits)
    #[arg(long)]
    pub code: Option<String>,

    /// Invoice price in the invoice currency
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Invoice currency code
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Gross weight in kilograms
    #[arg(long, default_value = "0")]
    pub weight: Decimal,

    /// Number of units (pieces)
    #[arg(long)]
    pub quantity: Option<u32>,

    /// Country of origin (ISO alpha-2; XX when unknown)
    #[arg(long, default_value = "XX")]
    pub origin: String,

    /// An origin certificate is held
    #[arg(long)]
    pub certificate: bool,

    /// Delivery cost in the invoice currency
    #[arg(long, default_value = "0")]
    pub delivery_cost: Decimal,

    /// Insurance cost in the invoice currency
    #[arg(long, default_value = "0")]
    pub insurance_cost: Decimal,

    /// Engine volume in cubic centimetres (vehicles)
    #[arg(long)]
    pub engine_volume: Option<u32>,

    /// Vehicle age in years (vehicles)
    #[arg(long)]
    pub vehicle_age: Option<u32>,

    /// Calculation date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

fn build_input(args: &CalculateArgs) -> Result<CalculationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    let code = args
        .code
        .clone()
        .ok_or("--code is required (or provide --input)")?;
    let price = args.price.ok_or("--price is required (or provide --input)")?;

    let mut calc_input = CalculationInput::new(code, price);
    calc_input.currency = args.currency.clone();
    calc_input.weight_kg = args.weight;
    calc_input.quantity = args.quantity;
    calc_input.origin_country = args.origin.clone();
    calc_input.has_certificate = args.certificate;
    calc_input.delivery_cost = args.delivery_cost;
    calc_input.insurance_cost = args.insurance_cost;
    calc_input.engine_volume_cc = args.engine_volume;
    calc_input.vehicle_age_years = args.vehicle_age;
    calc_input.calculation_date = args.date;
    Ok(calc_input)
}

pub fn run_calculate(
    args: CalculateArgs,
    config_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let catalog = load_catalog(&args.catalog)?;
    let calc_input = build_input(&args)?;

    let result = calculator::calculate_customs(&catalog, &calc_input, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(
    args: CalculateArgs,
    config_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let catalog = load_catalog(&args.catalog)?;
    let calc_input = build_input(&args)?;

    let result = calculator::calculate_summary(&catalog, &calc_input, &config)?;
    Ok(serde_json::to_value(result)?)
}
