//! Calculator settings that are policy rather than reference data: the local
//! currency, the fixed preferential-partner bloc, the processing-fee schedule
//! and the fallback base reference amounts used when no BRV is current.
//!
//! Every field has a default, so an empty YAML/JSON document deserialises to
//! the standard configuration.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CustomsError;
use crate::rates::fee_band::{default_fee_bands, FeeBand};
use crate::types::{Money, Percent};
use crate::CustomsResult;

/// Origin code used when the country of origin is not known.
pub const UNKNOWN_ORIGIN: &str = "XX";

/// Regional-bloc members that receive the preferential-partner duty column.
pub const PREFERENTIAL_PARTNERS: [&str; 11] = [
    "RU", "KZ", "KG", "TJ", "BY", "AM", "AZ", "MD", "UA", "GE", "TM",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Currency all payments are denominated in. Its rate is always 1.
    pub local_currency: String,
    /// Sentinel origin code meaning "unknown country".
    pub unknown_origin: String,
    /// Classification prefix of the vehicle chapter that attracts the
    /// utilization fee.
    pub vehicle_prefix: String,
    /// VAT applied when the tariff record carries none.
    pub default_vat_percent: Percent,
    /// BRV used for the processing fee when no yearly value is current.
    pub fee_brv_fallback: Money,
    /// BRV used for the utilization fee when no yearly value is current.
    pub utilization_brv_fallback: Money,
    pub preferential_partners: Vec<String>,
    pub fee_bands: Vec<FeeBand>,
    /// Shortest code the ancestor walk may truncate to.
    pub min_ancestor_len: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            local_currency: "UZS".to_string(),
            unknown_origin: UNKNOWN_ORIGIN.to_string(),
            vehicle_prefix: "8703".to_string(),
            default_vat_percent: dec!(12),
            fee_brv_fallback: dec!(412000),
            utilization_brv_fallback: dec!(375000),
            preferential_partners: PREFERENTIAL_PARTNERS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            fee_bands: default_fee_bands(),
            min_ancestor_len: 4,
        }
    }
}

impl CalculatorConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> CustomsResult<Self> {
        let config: CalculatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CustomsResult<()> {
        if self.local_currency.trim().is_empty() {
            return Err(CustomsError::Configuration(
                "local_currency must not be empty".into(),
            ));
        }
        if self.fee_bands.is_empty() {
            return Err(CustomsError::Configuration(
                "fee_bands must contain at least one band".into(),
            ));
        }
        if self.fee_bands.last().and_then(|b| b.upper_bound_usd).is_some() {
            return Err(CustomsError::Configuration(
                "the last fee band must be open-ended (no upper_bound_usd)".into(),
            ));
        }
        let bounds: Vec<_> = self
            .fee_bands
            .iter()
            .filter_map(|b| b.upper_bound_usd)
            .collect();
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CustomsError::Configuration(
                "fee band upper bounds must be strictly ascending".into(),
            ));
        }
        if self.default_vat_percent < dec!(0) {
            return Err(CustomsError::Configuration(
                "default_vat_percent must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn is_preferential_partner(&self, country: &str) -> bool {
        self.preferential_partners
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
    }

    pub fn is_unknown_origin(&self, country: &str) -> bool {
        let country = country.trim();
        country.is_empty() || country.eq_ignore_ascii_case(&self.unknown_origin)
    }

    pub fn is_local_currency(&self, currency: &str) -> bool {
        currency.trim().eq_ignore_ascii_case(&self.local_currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CalculatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fee_bands.len(), 7);
        assert!(config.is_preferential_partner("kz"));
        assert!(!config.is_preferential_partner("CN"));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = CalculatorConfig::from_json("{}").unwrap();
        assert_eq!(config, CalculatorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = CalculatorConfig::from_json(r#"{"local_currency": "KZT"}"#).unwrap();
        assert_eq!(config.local_currency, "KZT");
        assert_eq!(config.vehicle_prefix, "8703");
    }

    #[test]
    fn test_unknown_origin_sentinel() {
        let config = CalculatorConfig::default();
        assert!(config.is_unknown_origin("XX"));
        assert!(config.is_unknown_origin(""));
        assert!(config.is_unknown_origin("  "));
        assert!(!config.is_unknown_origin("DE"));
    }

    #[test]
    fn test_closed_last_band_rejected() {
        let mut config = CalculatorConfig::default();
        config.fee_bands.pop();
        match config.validate() {
            Err(CustomsError::Configuration(msg)) => assert!(msg.contains("open-ended")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }
}
