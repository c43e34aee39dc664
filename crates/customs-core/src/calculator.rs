use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::catalog::ReferenceCatalog;
use crate::classification::{lineage, resolve_classification, TariffSource};
use crate::config::CalculatorConfig;
use crate::error::CustomsError;
use crate::exchange::{resolve_exchange_rate, ResolvedRate};
use crate::payments::customs_fee::customs_fee;
use crate::payments::excise::excise;
use crate::payments::import_duty::import_duty;
use crate::payments::utilization::utilization_fee;
use crate::payments::vat::vat;
use crate::payments::{PaymentKind, PaymentLine};
use crate::rates::VehicleAttributes;
use crate::regime::{classify_regime, DutyRegime};
use crate::types::{
    checked_add, checked_div, checked_mul, with_metadata, ComputationOutput, Kilograms, Money,
    Percent,
};
use crate::CustomsResult;

/// Origins treated as holding an origin certificate by the simplified
/// summary calculation.
pub const CIS_CERTIFICATE_ORIGINS: [&str; 10] =
    ["RU", "KZ", "KG", "TJ", "BY", "AM", "AZ", "MD", "UA", "GE"];

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

fn default_currency() -> String {
    "USD".to_string()
}

fn default_origin() -> String {
    crate::config::UNKNOWN_ORIGIN.to_string()
}

/// One declared consignment line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Classification code, 2 to 10 digits.
    pub code: String,
    /// Invoice price in `currency`.
    pub price: Money,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, alias = "weight")]
    pub weight_kg: Kilograms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default = "default_origin", alias = "country_origin")]
    pub origin_country: String,
    #[serde(default)]
    pub has_certificate: bool,
    /// Delivery cost in `currency`, added to the customs value.
    #[serde(default)]
    pub delivery_cost: Money,
    /// Insurance cost in `currency`, added to the customs value.
    #[serde(default)]
    pub insurance_cost: Money,
    #[serde(default, alias = "engine_volume", skip_serializing_if = "Option::is_none")]
    pub engine_volume_cc: Option<u32>,
    #[serde(default, alias = "vehicle_age", skip_serializing_if = "Option::is_none")]
    pub vehicle_age_years: Option<u32>,
    /// Date rates are read for. Today (UTC) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_date: Option<NaiveDate>,
}

impl CalculationInput {
    pub fn new(code: impl Into<String>, price: Money) -> Self {
        Self {
            code: code.into(),
            price,
            currency: default_currency(),
            weight_kg: Decimal::ZERO,
            quantity: None,
            origin_country: default_origin(),
            has_certificate: false,
            delivery_cost: Decimal::ZERO,
            insurance_cost: Decimal::ZERO,
            engine_volume_cc: None,
            vehicle_age_years: None,
            calculation_date: None,
        }
    }

    pub fn validate(&self) -> CustomsResult<()> {
        let code = self.code.trim();
        if code.len() < 2 || code.len() > 10 {
            return Err(CustomsError::invalid(
                "code",
                "Classification code must be 2 to 10 digits",
            ));
        }
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(CustomsError::invalid(
                "code",
                "Classification code must contain digits only",
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(CustomsError::invalid("price", "Price must be positive"));
        }
        if self.currency.trim().is_empty() {
            return Err(CustomsError::invalid("currency", "Currency code is required"));
        }
        if self.weight_kg < Decimal::ZERO {
            return Err(CustomsError::invalid("weight_kg", "Weight cannot be negative"));
        }
        if self.delivery_cost < Decimal::ZERO {
            return Err(CustomsError::invalid(
                "delivery_cost",
                "Delivery cost cannot be negative",
            ));
        }
        if self.insurance_cost < Decimal::ZERO {
            return Err(CustomsError::invalid(
                "insurance_cost",
                "Insurance cost cannot be negative",
            ));
        }
        Ok(())
    }

    fn vehicle(&self) -> VehicleAttributes {
        VehicleAttributes {
            engine_volume_cc: self.engine_volume_cc,
            vehicle_age_years: self.vehicle_age_years,
        }
    }
}

/// Classification and tariff facts the result was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationDetails {
    pub code: String,
    pub description: String,
    /// Code whose tariff was applied.
    pub tariff_code: String,
    pub tariff_source: TariffSource,
    /// Codes from the chapter down to the declared code.
    pub hierarchy: Vec<String>,
    pub origin_country: String,
    pub has_certificate: bool,
    pub tariff_duty_percent: Option<Percent>,
    pub tariff_excise_percent: Option<Percent>,
    pub tariff_vat_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub customs_value_local: Money,
    pub customs_value_usd: Money,
    /// Payments in cascade order.
    pub payments: Vec<PaymentLine>,
    pub total_local: Money,
    pub total_usd: Money,
    /// Total payments as a percentage of the customs value, 2 dp.
    pub effective_rate_percent: Percent,
    pub regime: DutyRegime,
    /// Local units per unit of the invoice currency.
    pub exchange_rate: Decimal,
    /// Local units per USD.
    pub usd_rate: Decimal,
    pub details: CalculationDetails,
    pub warnings: Vec<String>,
}

impl CalculationResult {
    /// Amount of the line of the given kind, if one was produced.
    pub fn amount_of(&self, kind: PaymentKind) -> Option<Money> {
        self.payments
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.amount)
    }
}

/// Condensed result of [`calculate_summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSummary {
    pub customs_value_local: Money,
    pub customs_fee: Money,
    pub duty: Money,
    pub excise: Money,
    pub vat: Money,
    pub total: Money,
    pub exchange_rate: Decimal,
    pub tariff_duty_percent: Option<Percent>,
    pub tariff_excise_percent: Option<Percent>,
    pub regime: DutyRegime,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Compute every import payment due on a consignment line.
///
/// Stages run in a fixed order, each on the customs value plus what the
/// earlier stages charged: processing fee, import duty, excise, VAT and, for
/// vehicles, the utilization fee. Exchange rates and the BRV are read once and
/// reused throughout.
pub fn calculate_customs<C>(
    catalog: &C,
    input: &CalculationInput,
    config: &CalculatorConfig,
) -> CustomsResult<ComputationOutput<CalculationResult>>
where
    C: ReferenceCatalog + ?Sized,
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation ----------------------------------------------------------
    input.validate()?;
    let code = input.code.trim();
    let on = input
        .calculation_date
        .unwrap_or_else(|| Utc::now().date_naive());

    // -- Classification and regime -------------------------------------------
    let resolution = resolve_classification(catalog, code, config.min_ancestor_len)?
        .absorb(&mut warnings);
    debug!(
        code,
        tariff_code = resolution.tariff_code,
        source = ?resolution.source,
        "classification resolved"
    );

    let regime = classify_regime(
        catalog,
        config,
        &input.origin_country,
        input.has_certificate,
    )
    .absorb(&mut warnings);
    debug!(origin = %input.origin_country, %regime, "duty regime selected");

    // -- Exchange rates ------------------------------------------------------
    let invoice_rate = resolve_exchange_rate(catalog, config, &input.currency, on)?
        .absorb(&mut warnings);
    let usd_rate = if invoice_rate.currency == "USD" {
        invoice_rate.clone()
    } else {
        resolve_exchange_rate(catalog, config, "USD", on)?.absorb(&mut warnings)
    };
    log_stale(&invoice_rate);
    if usd_rate.currency != invoice_rate.currency {
        log_stale(&usd_rate);
    }

    // -- Customs value -------------------------------------------------------
    let invoice_total = checked_add(input.price, input.delivery_cost, "customs value")?;
    let invoice_total = checked_add(invoice_total, input.insurance_cost, "customs value")?;
    let customs_value = checked_mul(invoice_total, invoice_rate.rate, "customs value")?;
    let customs_value_usd = to_usd(customs_value, usd_rate.rate)?;
    debug!(%customs_value, %customs_value_usd, "customs value");

    let current_brv = catalog.current_brv(on);
    let tariff = resolution.tariff;
    let mut payments: Vec<PaymentLine> = Vec::with_capacity(5);

    // -- Processing fee ------------------------------------------------------
    let fee = customs_fee(
        &config.fee_bands,
        customs_value_usd,
        current_brv,
        config.fee_brv_fallback,
    )?
    .absorb(&mut warnings);
    debug!(amount = %fee.amount, "processing fee");
    payments.push(fee);

    // -- Import duty ---------------------------------------------------------
    let duty = import_duty(
        tariff,
        regime,
        customs_value,
        input.weight_kg,
        usd_rate.rate,
    )?
    .absorb(&mut warnings);
    let duty_amount = duty.amount;
    debug!(amount = %duty_amount, rate_kind = ?duty.rate_kind, "import duty");
    payments.push(duty);

    // -- Excise --------------------------------------------------------------
    let excise_line = excise(
        catalog.excise_rules(),
        tariff,
        code,
        customs_value,
        duty_amount,
        input.weight_kg,
        input.quantity,
    )?;
    let excise_amount = excise_line.amount;
    debug!(amount = %excise_amount, "excise");
    payments.push(excise_line);

    // -- VAT -----------------------------------------------------------------
    let vat_line = vat(
        tariff,
        customs_value,
        duty_amount,
        excise_amount,
        config.default_vat_percent,
    )?;
    debug!(amount = %vat_line.amount, "vat");
    payments.push(vat_line);

    // -- Utilization fee -----------------------------------------------------
    let utilization = utilization_fee(
        catalog.utilization_bands(),
        code,
        &input.vehicle(),
        &config.vehicle_prefix,
        current_brv,
        config.utilization_brv_fallback,
    )?
    .absorb(&mut warnings);
    if let Some(line) = utilization {
        debug!(amount = %line.amount, "utilization fee");
        payments.push(line);
    }

    // -- Aggregation ---------------------------------------------------------
    let total_local = payments
        .iter()
        .try_fold(Money::ZERO, |acc, p| checked_add(acc, p.amount, "total"))?;
    let total_usd = to_usd(total_local, usd_rate.rate)?;
    let effective_rate_percent = if customs_value.is_zero() {
        Decimal::ZERO
    } else {
        let ratio = checked_div(total_local, customs_value, "effective rate")?;
        checked_mul(ratio, dec!(100), "effective rate")?.round_dp(2)
    };

    for w in &warnings {
        warn!(code, "{}", w);
    }

    let details = CalculationDetails {
        code: resolution.entry.code.clone(),
        description: resolution.entry.description.clone(),
        tariff_code: resolution.tariff_code.to_string(),
        tariff_source: resolution.source,
        hierarchy: lineage(catalog, resolution.entry)
            .into_iter()
            .map(|e| e.code.clone())
            .collect(),
        origin_country: input.origin_country.trim().to_ascii_uppercase(),
        has_certificate: input.has_certificate,
        tariff_duty_percent: tariff.duty_percent,
        tariff_excise_percent: tariff.excise_percent,
        tariff_vat_percent: tariff.vat_percent.unwrap_or(config.default_vat_percent),
    };

    let result = CalculationResult {
        customs_value_local: customs_value,
        customs_value_usd,
        payments,
        total_local,
        total_usd,
        effective_rate_percent,
        regime,
        exchange_rate: invoice_rate.rate,
        usd_rate: usd_rate.rate,
        details,
        warnings: warnings.clone(),
    };

    let assumptions = serde_json::json!({
        "calculation_date": on.to_string(),
        "currency": invoice_rate.currency,
        "exchange_rate_date": invoice_rate.date.map(|d| d.to_string()),
        "usd_rate_date": usd_rate.date.map(|d| d.to_string()),
        "brv": current_brv.map(|b| b.amount.to_string()),
        "local_currency": config.local_currency,
        "default_vat_percent": config.default_vat_percent.to_string(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Customs payment cascade: fee, duty, excise, VAT, utilization",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Simplified calculation for quick estimates.
///
/// Origins in the CIS list are assumed to hold an origin certificate; the full
/// calculation then runs and its payment lines are flattened to amounts.
pub fn calculate_summary<C>(
    catalog: &C,
    input: &CalculationInput,
    config: &CalculatorConfig,
) -> CustomsResult<ComputationOutput<CalculationSummary>>
where
    C: ReferenceCatalog + ?Sized,
{
    let start = Instant::now();

    let mut effective = input.clone();
    let origin = effective.origin_country.trim().to_ascii_uppercase();
    if CIS_CERTIFICATE_ORIGINS.contains(&origin.as_str()) {
        effective.has_certificate = true;
    }

    let full = calculate_customs(catalog, &effective, config)?;
    let r = &full.result;
    let amount = |kind| r.amount_of(kind).unwrap_or(Decimal::ZERO);

    let summary = CalculationSummary {
        customs_value_local: r.customs_value_local,
        customs_fee: amount(PaymentKind::CustomsFee),
        duty: amount(PaymentKind::ImportDuty),
        excise: amount(PaymentKind::Excise),
        vat: amount(PaymentKind::Vat),
        total: r.total_local,
        exchange_rate: r.exchange_rate,
        tariff_duty_percent: r.details.tariff_duty_percent,
        tariff_excise_percent: r.details.tariff_excise_percent,
        regime: r.regime,
        warnings: r.warnings.clone(),
    };

    let assumptions = serde_json::json!({
        "certificate_assumed": effective.has_certificate && !input.has_certificate,
        "origin_country": origin,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Customs payment summary",
        &assumptions,
        full.warnings,
        elapsed,
        summary,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_usd(amount: Money, usd_rate: Decimal) -> CustomsResult<Money> {
    if usd_rate > Decimal::ZERO {
        checked_div(amount, usd_rate, "USD conversion")
    } else {
        Ok(Decimal::ZERO)
    }
}

fn log_stale(rate: &ResolvedRate) {
    if rate.stale {
        debug!(currency = %rate.currency, date = ?rate.date, "stale exchange rate used");
    }
}
