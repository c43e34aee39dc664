use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CustomsError;
use crate::CustomsResult;

/// Monetary amounts. Local currency unless the field name says otherwise.
pub type Money = Decimal;

/// Rates expressed as percentages (12 = 12%), the way tariff schedules
/// publish them.
pub type Percent = Decimal;

/// Physical weight in kilograms.
pub type Kilograms = Decimal;

/// Multiplier applied to the base reference amount (BRV).
pub type Coefficient = Decimal;

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

fn overflow(context: &str) -> CustomsError {
    CustomsError::Overflow {
        context: context.to_string(),
    }
}

pub fn checked_add(a: Decimal, b: Decimal, context: &str) -> CustomsResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn checked_mul(a: Decimal, b: Decimal, context: &str) -> CustomsResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

/// `a / b`. A zero divisor is reported as an overflow as well.
pub fn checked_div(a: Decimal, b: Decimal, context: &str) -> CustomsResult<Decimal> {
    a.checked_div(b).ok_or_else(|| overflow(context))
}

/// `base × percent / 100`.
pub fn percent_of(base: Money, percent: Percent, context: &str) -> CustomsResult<Money> {
    checked_mul(base, percent / dec!(100), context)
}

/// A value paired with the advisories raised while producing it.
///
/// Stages of a calculation return their warnings alongside the value instead
/// of writing into shared state; the calculator drains them in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Advised<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Advised<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Move the warnings into `sink` and hand back the value.
    pub fn absorb(self, sink: &mut Vec<String>) -> T {
        sink.extend(self.warnings);
        self.value
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advised_absorb_keeps_order() {
        let mut sink = vec!["first".to_string()];
        let value = Advised::clean(7)
            .with_warning("second")
            .with_warning("third")
            .absorb(&mut sink);

        assert_eq!(value, 7);
        assert_eq!(sink, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_checked_helpers() {
        assert_eq!(percent_of(dec!(1285000), dec!(20), "duty").unwrap(), dec!(257000));
        assert_eq!(checked_div(dec!(25700), dec!(12850), "usd").unwrap(), dec!(2));
        match checked_mul(Decimal::MAX, dec!(2), "customs value").unwrap_err() {
            CustomsError::Overflow { context } => assert_eq!(context, "customs value"),
            other => panic!("Expected Overflow, got {:?}", other),
        }
        assert!(checked_div(dec!(1), dec!(0), "rate").is_err());
        assert!(checked_add(Decimal::MAX, dec!(1), "total").is_err());
    }

    #[test]
    fn test_with_metadata_populates_envelope() {
        let out = with_metadata(
            "test",
            &serde_json::json!({"k": 1}),
            vec!["w".into()],
            42,
            "ok",
        );
        assert_eq!(out.result, "ok");
        assert_eq!(out.metadata.computation_time_us, 42);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.warnings.len(), 1);
    }
}
