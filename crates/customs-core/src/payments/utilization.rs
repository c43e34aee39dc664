use crate::catalog::{BrvRate, FeeFormula, UtilizationBand};
use crate::rates::{brv_or_fallback, select_utilization_band, VehicleAttributes};
use crate::types::{checked_mul, Advised, Money};
use crate::CustomsResult;

use super::{PaymentKind, PaymentLine, RateKind};

/// Utilization fee for a vehicle, or `None` when no line is due.
///
/// Only codes under `vehicle_prefix` are assessed. A vehicle with no matching
/// band gets a warning and no line. Percent-of-value bands, zero multipliers
/// and zero fixed amounts produce no line.
pub fn utilization_fee(
    bands: &[UtilizationBand],
    code: &str,
    vehicle: &VehicleAttributes,
    vehicle_prefix: &str,
    current_brv: Option<&BrvRate>,
    brv_fallback: Money,
) -> CustomsResult<Advised<Option<PaymentLine>>> {
    if !code.starts_with(vehicle_prefix) {
        return Ok(Advised::clean(None));
    }

    let Some(band) = select_utilization_band(bands, code, vehicle) else {
        return Ok(Advised::clean(None)
            .with_warning(format!("No utilization fee band found for vehicle code {}", code)));
    };

    let advised = match &band.formula {
        FeeFormula::BrvMultiplier { multiplier } if !multiplier.is_zero() => {
            let brv = brv_or_fallback(current_brv, brv_fallback);
            let line = PaymentLine::new(
                PaymentKind::UtilizationFee,
                brv.amount,
                Some(*multiplier),
                RateKind::BrvMultiple,
                checked_mul(brv.amount, *multiplier, "utilization fee")?,
            )
            .with_note(format!("BRV x {}", multiplier));
            let advised = Advised::clean(Some(line));
            if brv.is_fallback {
                advised.with_warning(format!(
                    "No current BRV on record; utilization fee uses the fallback BRV of {}",
                    brv_fallback
                ))
            } else {
                advised
            }
        }
        FeeFormula::Fixed { amount } if !amount.is_zero() => Advised::clean(Some(PaymentLine::new(
            PaymentKind::UtilizationFee,
            Money::ZERO,
            Some(*amount),
            RateKind::Fixed,
            *amount,
        ))),
        FeeFormula::BrvMultiplier { .. } | FeeFormula::Fixed { .. } | FeeFormula::Percent { .. } => {
            Advised::clean(None)
        }
    };
    Ok(advised)
}
