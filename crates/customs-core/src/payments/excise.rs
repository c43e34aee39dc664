use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::{ExciseRule, ExciseUnit, TariffRecord};
use crate::rates::best_excise_rule;
use crate::types::{checked_add, checked_mul, percent_of, Kilograms, Money};
use crate::CustomsResult;

use super::{PaymentKind, PaymentLine, RateKind};

const CONTEXT: &str = "excise";

/// Amount and base of a specific excise rate for the declared goods.
///
/// Volume units are approximated from weight: 1 kg is taken as 1 liter, or
/// 1000 ml. Count-based units use the declared quantity, or 1 if none.
fn specific_amount(
    unit: ExciseUnit,
    rate: Money,
    weight_kg: Kilograms,
    quantity: Option<u32>,
) -> CustomsResult<(Decimal, Money)> {
    let qty = Decimal::from(quantity.unwrap_or(1));
    let (unit_base, units) = match unit {
        ExciseUnit::PerThousandUnits => (qty, qty / dec!(1000)),
        ExciseUnit::PerUnit => (qty, qty),
        ExciseUnit::PerLiter => (qty, weight_kg),
        ExciseUnit::PerKilogram => (weight_kg, weight_kg),
        ExciseUnit::PerTonne => (weight_kg, weight_kg / dec!(1000)),
        ExciseUnit::PerMilliliter => (qty, checked_mul(weight_kg, dec!(1000), CONTEXT)?),
        ExciseUnit::Unrecognized => (qty, weight_kg),
    };
    Ok((unit_base, checked_mul(units, rate, CONTEXT)?))
}

fn from_rule(
    rule: &ExciseRule,
    base: Money,
    weight_kg: Kilograms,
    quantity: Option<u32>,
) -> CustomsResult<Option<PaymentLine>> {
    if let Some(rate) = rule.rate_specific.filter(|r| !r.is_zero()) {
        let unit = rule.unit();
        let (unit_base, amount) = specific_amount(unit, rate, weight_kg, quantity)?;
        return Ok(Some(
            PaymentLine::new(PaymentKind::Excise, unit_base, Some(rate), RateKind::Specific, amount)
                .with_note(format!("{}: {} {}", rule.display_name(), rate, unit)),
        ));
    }

    let Some(percent) = rule.rate_percent.filter(|p| !p.is_zero()) else {
        return Ok(None);
    };
    Ok(Some(
        PaymentLine::new(
            PaymentKind::Excise,
            base,
            Some(percent),
            RateKind::Percent,
            percent_of(base, percent, CONTEXT)?,
        )
        .with_note(format!("{}: {}%", rule.display_name(), percent)),
    ))
}

/// Excise on `customs_value + duty`.
///
/// The excise-rule table is consulted first (best prefix match); a matched
/// rule's specific rate takes precedence over its percent rate. Without a
/// usable rule the tariff's own excise percent applies, and failing that the
/// goods are not excisable.
pub fn excise(
    rules: &[ExciseRule],
    tariff: &TariffRecord,
    code: &str,
    customs_value: Money,
    duty_amount: Money,
    weight_kg: Kilograms,
    quantity: Option<u32>,
) -> CustomsResult<PaymentLine> {
    let base = checked_add(customs_value, duty_amount, CONTEXT)?;

    if let Some(matched) = best_excise_rule(rules, code) {
        if let Some(line) = from_rule(matched.rule, base, weight_kg, quantity)? {
            return Ok(line);
        }
    }

    if let Some(percent) = tariff.excise_percent.filter(|p| !p.is_zero()) {
        return Ok(PaymentLine::new(
            PaymentKind::Excise,
            base,
            Some(percent),
            RateKind::Percent,
            percent_of(base, percent, CONTEXT)?,
        ));
    }

    Ok(
        PaymentLine::new(PaymentKind::Excise, base, Some(dec!(0)), RateKind::Percent, dec!(0))
            .with_note("Not subject to excise"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ClassificationId;

    fn tariff(excise_percent: Option<Decimal>) -> TariffRecord {
        TariffRecord {
            classification_id: ClassificationId(1),
            duty_percent: Some(dec!(10)),
            duty_percent_standard: None,
            duty_specific: None,
            duty_specific_standard: None,
            specific_unit: None,
            excise_percent,
            excise_specific: None,
            vat_percent: None,
            source_url: None,
        }
    }

    fn specific_rule(codes: &str, rate: Decimal, unit: &str) -> ExciseRule {
        ExciseRule {
            id: 1,
            category: "tobacco".into(),
            product_name: "Cigarettes with filter".into(),
            product_name_local: Some("Filtrli sigaretlar".into()),
            codes: codes.into(),
            rate_percent: None,
            rate_specific: Some(rate),
            rate_unit: Some(unit.into()),
            is_active: true,
        }
    }

    fn percent_rule(codes: &str, percent: Decimal) -> ExciseRule {
        ExciseRule {
            id: 2,
            category: "beverages".into(),
            product_name: "Sweetened beverages".into(),
            product_name_local: None,
            codes: codes.into(),
            rate_percent: Some(percent),
            rate_specific: None,
            rate_unit: None,
            is_active: true,
        }
    }

    #[test]
    fn test_percent_rule_on_value_plus_duty() {
        let rules = vec![percent_rule("2202", dec!(20))];
        let line = excise(&rules, &tariff(None), "2202100000", dec!(1285000), dec!(257000), dec!(1000), None).unwrap();
        assert_eq!(line.base, dec!(1542000));
        assert_eq!(line.amount, dec!(308400));
        assert_eq!(line.rate_kind, RateKind::Percent);
    }

    #[test]
    fn test_per_thousand_units() {
        let rules = vec![specific_rule("2402", dec!(250000), "sum/1000pcs")];
        let line = excise(&rules, &tariff(None), "2402209000", dec!(1), dec!(0), dec!(12), Some(20000)).unwrap();
        assert_eq!(line.amount, dec!(5000000));
        assert_eq!(line.base, dec!(20000));
        assert_eq!(line.rate_kind, RateKind::Specific);
        assert!(line.note.unwrap().starts_with("Filtrli sigaretlar"));
    }

    #[test]
    fn test_count_units_default_to_one() {
        let rules = vec![specific_rule("2402", dec!(250000), "sum/1000pcs")];
        let line = excise(&rules, &tariff(None), "2402209000", dec!(1), dec!(0), dec!(12), None).unwrap();
        assert_eq!(line.amount, dec!(250));
    }

    #[test]
    fn test_weight_based_units() {
        let cases = [
            ("sum/pcs", Some(3), dec!(300)),
            ("sum/liter", None, dec!(5000)),
            ("sum/kg", None, dec!(5000)),
            ("sum/ton", None, dec!(5)),
            ("sum/ml", None, dec!(5000000)),
            ("sum", None, dec!(5000)),
        ];
        for (unit, qty, expected) in cases {
            let rules = vec![specific_rule("2208", dec!(100), unit)];
            let line = excise(&rules, &tariff(None), "2208601100", dec!(1), dec!(0), dec!(50), qty).unwrap();
            assert_eq!(line.amount, expected, "unit {}", unit);
        }
    }

    #[test]
    fn test_legacy_tariff_percent_when_no_rule() {
        let rules = vec![percent_rule("2202", dec!(20))];
        let line = excise(&rules, &tariff(Some(dec!(15))), "3303000000", dec!(1000), dec!(100), dec!(1), None).unwrap();
        assert_eq!(line.amount, dec!(165));
        assert_eq!(line.rate, Some(dec!(15)));
    }

    #[test]
    fn test_rule_without_rates_falls_back_to_tariff() {
        let mut empty = percent_rule("3303", dec!(0));
        empty.rate_percent = None;
        let line = excise(&[empty], &tariff(Some(dec!(10))), "3303000000", dec!(1000), dec!(0), dec!(1), None).unwrap();
        assert_eq!(line.amount, dec!(100));
    }

    #[test]
    fn test_specific_excise_overflow_is_an_error() {
        let rules = vec![specific_rule("2402", dec!(250000), "sum/kg")];
        let err = excise(
            &rules,
            &tariff(None),
            "2402209000",
            dec!(1),
            dec!(0),
            dec!(10000000000000000000000000),
            None,
        )
        .unwrap_err();
        match err {
            crate::CustomsError::Overflow { context } => assert_eq!(context, "excise"),
            other => panic!("Expected Overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_not_excisable() {
        let line = excise(&[], &tariff(None), "8471300000", dec!(1000), dec!(100), dec!(1), None).unwrap();
        assert_eq!(line.amount, dec!(0));
        assert_eq!(line.note.as_deref(), Some("Not subject to excise"));
    }
}
