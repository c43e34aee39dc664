use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomsError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Classification not found: no tariff is registered for code {code} or any code in its hierarchy")]
    ClassificationNotFound { code: String },

    #[error("Exchange rate not found: no rate has ever been recorded for {currency}")]
    ExchangeRateNotFound { currency: String },

    #[error("Inconsistent reference catalog: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Arithmetic overflow in {context}: amounts exceed the representable range")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CustomsError {
    /// True for the two caller-visible "not found" conditions, as opposed to
    /// bad input or broken reference data.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CustomsError::ClassificationNotFound { .. } | CustomsError::ExchangeRateNotFound { .. }
        )
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CustomsError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CustomsError {
    fn from(e: serde_json::Error) -> Self {
        CustomsError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = CustomsError::ClassificationNotFound {
            code: "9999".into(),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("9999"));

        let err = CustomsError::ExchangeRateNotFound {
            currency: "EUR".into(),
        };
        assert!(err.is_not_found());

        let err = CustomsError::invalid("price", "Price must be positive");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_overflow_is_not_a_lookup_failure() {
        let err = CustomsError::Overflow {
            context: "customs value".into(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("customs value"));
    }
}
