use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::ReferenceCatalog;
use crate::config::CalculatorConfig;
use crate::error::CustomsError;
use crate::types::Advised;
use crate::CustomsResult;

/// An exchange rate as read for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub currency: String,
    /// Local currency units per one unit of `currency`.
    pub rate: Decimal,
    /// Date the rate was published; `None` for the local currency.
    pub date: Option<NaiveDate>,
    /// True when no rate was published for the calculation date and the
    /// latest earlier (or later) one was used instead.
    pub stale: bool,
}

/// Read the rate for `currency` on `on`, falling back to the most recent rate
/// on record with a warning. A currency that has never been quoted is fatal.
pub fn resolve_exchange_rate<C>(
    catalog: &C,
    config: &CalculatorConfig,
    currency: &str,
    on: NaiveDate,
) -> CustomsResult<Advised<ResolvedRate>>
where
    C: ReferenceCatalog + ?Sized,
{
    let currency = currency.trim().to_ascii_uppercase();

    if config.is_local_currency(&currency) {
        return Ok(Advised::clean(ResolvedRate {
            currency,
            rate: dec!(1),
            date: None,
            stale: false,
        }));
    }

    if let Some(rate) = catalog.exchange_rate_on(&currency, on) {
        return Ok(Advised::clean(ResolvedRate {
            currency,
            rate: rate.rate,
            date: Some(rate.date),
            stale: false,
        }));
    }

    match catalog.latest_exchange_rate(&currency) {
        Some(rate) => {
            let warning = format!(
                "No {} rate published for {}; using the latest rate from {}",
                currency, on, rate.date
            );
            Ok(Advised::clean(ResolvedRate {
                currency,
                rate: rate.rate,
                date: Some(rate.date),
                stale: true,
            })
            .with_warning(warning))
        }
        None => Err(CustomsError::ExchangeRateNotFound { currency }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, ExchangeRate, InMemoryCatalog};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(CatalogSnapshot {
            exchange_rates: vec![
                ExchangeRate {
                    currency: "USD".into(),
                    rate: dec!(12850),
                    date: date(10),
                    is_active: true,
                },
                ExchangeRate {
                    currency: "EUR".into(),
                    rate: dec!(13900.5),
                    date: date(8),
                    is_active: true,
                },
            ],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rate_for_calculation_date() {
        let config = CalculatorConfig::default();
        let r = resolve_exchange_rate(&catalog(), &config, "usd", date(10)).unwrap();
        assert!(r.warnings.is_empty());
        assert_eq!(r.value.rate, dec!(12850));
        assert_eq!(r.value.currency, "USD");
        assert!(!r.value.stale);
    }

    #[test]
    fn test_stale_rate_warns() {
        let config = CalculatorConfig::default();
        let r = resolve_exchange_rate(&catalog(), &config, "EUR", date(10)).unwrap();
        assert!(r.value.stale);
        assert_eq!(r.value.rate, dec!(13900.5));
        assert_eq!(r.value.date, Some(date(8)));
        assert_eq!(r.warnings.len(), 1);
        assert!(r.warnings[0].contains("EUR"));
    }

    #[test]
    fn test_local_currency_is_one() {
        let config = CalculatorConfig::default();
        let r = resolve_exchange_rate(&catalog(), &config, "UZS", date(10)).unwrap();
        assert_eq!(r.value.rate, dec!(1));
        assert_eq!(r.value.date, None);
    }

    #[test]
    fn test_unknown_currency_is_fatal() {
        let config = CalculatorConfig::default();
        match resolve_exchange_rate(&catalog(), &config, "GBP", date(10)) {
            Err(CustomsError::ExchangeRateNotFound { currency }) => assert_eq!(currency, "GBP"),
            other => panic!("Expected ExchangeRateNotFound, got {:?}", other),
        }
    }
}
