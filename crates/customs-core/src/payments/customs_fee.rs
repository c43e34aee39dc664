use crate::catalog::BrvRate;
use crate::error::CustomsError;
use crate::rates::{brv_or_fallback, fee_coefficient, FeeBand};
use crate::types::{checked_mul, Advised, Money};
use crate::CustomsResult;

use super::{PaymentKind, PaymentLine, RateKind};

/// Processing (customs clearance) fee: the schedule coefficient for the USD
/// customs value times the current BRV.
pub fn customs_fee(
    bands: &[FeeBand],
    customs_value_usd: Money,
    current_brv: Option<&BrvRate>,
    brv_fallback: Money,
) -> CustomsResult<Advised<PaymentLine>> {
    let coefficient = fee_coefficient(bands, customs_value_usd).ok_or_else(|| {
        CustomsError::Configuration(format!(
            "no processing-fee band covers a customs value of {} USD",
            customs_value_usd
        ))
    })?;

    let brv = brv_or_fallback(current_brv, brv_fallback);
    let amount = checked_mul(brv.amount, coefficient, "processing fee")?;
    let line = PaymentLine::new(
        PaymentKind::CustomsFee,
        brv.amount,
        Some(coefficient),
        RateKind::BrvMultiple,
        amount,
    )
    .with_note(format!("BRV x {}", coefficient));

    let mut advised = Advised::clean(line);
    if brv.is_fallback {
        advised = advised.with_warning(format!(
            "No current BRV on record; processing fee uses the fallback BRV of {}",
            brv_fallback
        ));
    }
    Ok(advised)
}
