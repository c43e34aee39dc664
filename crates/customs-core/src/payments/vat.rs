use crate::catalog::TariffRecord;
use crate::types::{checked_add, percent_of, Money, Percent};
use crate::CustomsResult;

use super::{PaymentKind, PaymentLine, RateKind};

/// VAT on `customs_value + duty + excise`, at the tariff's rate or
/// `default_percent` when the tariff carries none. Always charged.
pub fn vat(
    tariff: &TariffRecord,
    customs_value: Money,
    duty_amount: Money,
    excise_amount: Money,
    default_percent: Percent,
) -> CustomsResult<PaymentLine> {
    let base = checked_add(customs_value, duty_amount, "VAT")?;
    let base = checked_add(base, excise_amount, "VAT")?;
    let percent = tariff.vat_percent.unwrap_or(default_percent);
    Ok(PaymentLine::new(
        PaymentKind::Vat,
        base,
        Some(percent),
        RateKind::Percent,
        percent_of(base, percent, "VAT")?,
    ))
}
