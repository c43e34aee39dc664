pub mod calculator;
pub mod catalog;
pub mod classification;
pub mod config;
pub mod error;
pub mod exchange;
pub mod payments;
pub mod rates;
pub mod regime;
pub mod types;

pub use calculator::{calculate_customs, calculate_summary, CalculationInput, CalculationResult};
pub use catalog::{CatalogSnapshot, InMemoryCatalog, ReferenceCatalog};
pub use config::CalculatorConfig;
pub use error::CustomsError;
pub use regime::DutyRegime;
pub use types::*;

/// Standard result type for all customs operations
pub type CustomsResult<T> = Result<T, CustomsError>;
