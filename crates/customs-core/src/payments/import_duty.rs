use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::TariffRecord;
use crate::regime::DutyRegime;
use crate::types::{checked_mul, percent_of, Advised, Kilograms, Money, Percent};
use crate::CustomsResult;

use super::{PaymentKind, PaymentLine, RateKind};

/// Duty rates selected from the tariff for a regime.
#[derive(Debug, Clone, PartialEq)]
pub struct DutyRates {
    pub percent: Percent,
    /// USD per kilogram.
    pub specific: Option<Money>,
    pub note: String,
}

fn doubled(value: Option<Decimal>) -> Decimal {
    value.unwrap_or_default() * dec!(2)
}

/// Pick the ad-valorem and specific duty rates that apply under `regime`.
/// Returns `None` for free trade, where no duty is due.
pub fn select_duty_rates(tariff: &TariffRecord, regime: DutyRegime) -> Advised<Option<DutyRates>> {
    match regime {
        DutyRegime::FreeTrade => Advised::clean(None),
        DutyRegime::PreferentialPartner | DutyRegime::Preferential => Advised::clean(Some(DutyRates {
            percent: tariff.duty_percent.unwrap_or_default(),
            specific: tariff.duty_specific,
            note: "Preferential-partner rate".to_string(),
        })),
        DutyRegime::UnknownOrigin => Advised::clean(Some(DutyRates {
            percent: doubled(tariff.duty_percent),
            specific: Some(doubled(tariff.duty_specific)),
            note: "Unknown origin (double rate)".to_string(),
        })),
        DutyRegime::Standard => {
            let specific = tariff
                .duty_specific_standard
                .or_else(|| tariff.duty_specific.map(|s| s * dec!(2)));
            match tariff.duty_percent_standard {
                Some(percent) => Advised::clean(Some(DutyRates {
                    percent,
                    specific,
                    note: "Standard rate".to_string(),
                })),
                None => Advised::clean(Some(DutyRates {
                    percent: doubled(tariff.duty_percent),
                    specific,
                    note: "Standard rate unavailable; preferential rate doubled".to_string(),
                }))
                .with_warning(
                    "No standard-column duty rate published; using twice the preferential rate",
                ),
            }
        }
    }
}

/// Import duty under `regime`.
///
/// Ad-valorem duty is `customs_value × percent / 100`; specific duty is
/// `USD/kg × usd_rate × weight`. The specific amount is charged only when it
/// is strictly greater than the ad-valorem amount and positive.
pub fn import_duty(
    tariff: &TariffRecord,
    regime: DutyRegime,
    customs_value: Money,
    weight_kg: Kilograms,
    usd_rate: Decimal,
) -> CustomsResult<Advised<PaymentLine>> {
    let Advised { value: rates, warnings } = select_duty_rates(tariff, regime);

    let Some(rates) = rates else {
        return Ok(Advised {
            value: PaymentLine::new(
                PaymentKind::ImportDuty,
                customs_value,
                Some(dec!(0)),
                RateKind::Percent,
                dec!(0),
            )
            .with_note("Free trade (origin certificate)"),
            warnings,
        });
    };

    let ad_valorem = percent_of(customs_value, rates.percent, "import duty")?;
    let specific = rates
        .specific
        .filter(|s| !s.is_zero())
        .map(|s| -> CustomsResult<(Money, Money)> {
            let per_kg = checked_mul(s, usd_rate, "specific import duty")?;
            Ok((s, checked_mul(per_kg, weight_kg, "specific import duty")?))
        })
        .transpose()?;

    let line = match specific {
        Some((rate, amount)) if amount > ad_valorem && amount > dec!(0) => PaymentLine::new(
            PaymentKind::ImportDuty,
            weight_kg,
            Some(rate),
            RateKind::Specific,
            amount,
        )
        .with_note(format!("Specific rate ${}/kg, {}", rate, rates.note)),
        _ => PaymentLine::new(
            PaymentKind::ImportDuty,
            customs_value,
            Some(rates.percent),
            RateKind::Percent,
            ad_valorem,
        )
        .with_note(rates.note),
    };

    Ok(Advised {
        value: line,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ClassificationId;

    fn tariff(percent: Option<Decimal>, specific: Option<Decimal>) -> TariffRecord {
        TariffRecord {
            classification_id: ClassificationId(1),
            duty_percent: percent,
            duty_percent_standard: None,
            duty_specific: specific,
            duty_specific_standard: None,
            specific_unit: Some("kg".into()),
            excise_percent: None,
            excise_specific: None,
            vat_percent: None,
            source_url: None,
        }
    }

    const USD: Decimal = dec!(12850);

    #[test]
    fn test_preferential_partner_ad_valorem() {
        let out = import_duty(
            &tariff(Some(dec!(20)), None),
            DutyRegime::PreferentialPartner,
            dec!(1285000),
            dec!(1000),
            USD,
        )
        .unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.value.amount, dec!(257000));
        assert_eq!(out.value.rate_kind, RateKind::Percent);
        assert_eq!(out.value.base, dec!(1285000));
    }

    #[test]
    fn test_unknown_origin_doubles_percent() {
        let out = import_duty(
            &tariff(Some(dec!(15)), None),
            DutyRegime::UnknownOrigin,
            dec!(1000000),
            dec!(10),
            USD,
        )
        .unwrap();
        assert_eq!(out.value.rate, Some(dec!(30)));
        assert_eq!(out.value.amount, dec!(300000));
    }

    #[test]
    fn test_free_trade_is_zero() {
        let out = import_duty(
            &tariff(Some(dec!(30)), Some(dec!(5))),
            DutyRegime::FreeTrade,
            dec!(1000000),
            dec!(100),
            USD,
        )
        .unwrap();
        assert_eq!(out.value.amount, dec!(0));
        assert_eq!(out.value.rate_kind, RateKind::Percent);
        assert!(out.value.note.unwrap().contains("Free trade"));
    }

    #[test]
    fn test_standard_column_used_when_present() {
        let mut t = tariff(Some(dec!(10)), None);
        t.duty_percent_standard = Some(dec!(25));
        let out = import_duty(&t, DutyRegime::Standard, dec!(1000000), dec!(1), USD).unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.value.amount, dec!(250000));
        assert_eq!(out.value.note.as_deref(), Some("Standard rate"));
    }

    #[test]
    fn test_standard_column_missing_doubles_preferential() {
        let out = import_duty(
            &tariff(Some(dec!(10)), None),
            DutyRegime::Standard,
            dec!(1000000),
            dec!(1),
            USD,
        )
        .unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.value.rate, Some(dec!(20)));
        assert_eq!(out.value.amount, dec!(200000));
        assert!(out.value.note.unwrap().contains("doubled"));
    }

    #[test]
    fn test_specific_wins_when_strictly_greater() {
        // ad valorem: 1,285,000 × 5% = 64,250
        // specific: 0.1 USD/kg × 12,850 × 1000 kg = 1,285,000
        let out = import_duty(
            &tariff(Some(dec!(5)), Some(dec!(0.1))),
            DutyRegime::PreferentialPartner,
            dec!(1285000),
            dec!(1000),
            USD,
        )
        .unwrap();
        assert_eq!(out.value.rate_kind, RateKind::Specific);
        assert_eq!(out.value.amount, dec!(1285000));
        assert_eq!(out.value.base, dec!(1000));
        assert_eq!(out.value.rate, Some(dec!(0.1)));
    }

    #[test]
    fn test_ad_valorem_wins_on_tie() {
        // ad valorem: 1,285,000 × 10% = 128,500; specific: 0.01 × 12,850 × 1000 = 128,500
        let out = import_duty(
            &tariff(Some(dec!(10)), Some(dec!(0.01))),
            DutyRegime::PreferentialPartner,
            dec!(1285000),
            dec!(1000),
            USD,
        )
        .unwrap();
        assert_eq!(out.value.rate_kind, RateKind::Percent);
        assert_eq!(out.value.amount, dec!(128500));
    }

    #[test]
    fn test_zero_weight_keeps_ad_valorem() {
        let out = import_duty(
            &tariff(Some(dec!(0)), Some(dec!(3))),
            DutyRegime::PreferentialPartner,
            dec!(1000),
            dec!(0),
            USD,
        )
        .unwrap();
        assert_eq!(out.value.rate_kind, RateKind::Percent);
        assert_eq!(out.value.amount, dec!(0));
    }

    #[test]
    fn test_specific_duty_overflow_is_an_error() {
        let err = import_duty(
            &tariff(Some(dec!(5)), Some(dec!(1.5))),
            DutyRegime::PreferentialPartner,
            dec!(1000),
            dec!(10000000000000000000000000),
            USD,
        )
        .unwrap_err();
        match err {
            crate::CustomsError::Overflow { context } => assert_eq!(context, "specific import duty"),
            other => panic!("Expected Overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_origin_doubles_specific() {
        let out = import_duty(
            &tariff(Some(dec!(0)), Some(dec!(0.5))),
            DutyRegime::UnknownOrigin,
            dec!(1000),
            dec!(2),
            USD,
        )
        .unwrap();
        assert_eq!(out.value.rate_kind, RateKind::Specific);
        assert_eq!(out.value.rate, Some(dec!(1.0)));
        assert_eq!(out.value.amount, dec!(25700));
    }
}
