//! The five payment stages of the customs cascade.
//!
//! Each stage is a pure function of the customs value, the amounts of the
//! stages before it, and read-only reference data. The order is fixed:
//! processing fee, import duty, excise, VAT, utilization fee.

pub mod customs_fee;
pub mod excise;
pub mod import_duty;
pub mod utilization;
pub mod vat;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Which payment a line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    CustomsFee,
    ImportDuty,
    Excise,
    Vat,
    UtilizationFee,
}

impl PaymentKind {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentKind::CustomsFee => "Customs Fee",
            PaymentKind::ImportDuty => "Import Duty",
            PaymentKind::Excise => "Excise Tax",
            PaymentKind::Vat => "VAT",
            PaymentKind::UtilizationFee => "Utilization Fee",
        }
    }
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How the `rate` of a payment line is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// Percentage of `base`.
    Percent,
    /// Amount per physical unit of `base`.
    Specific,
    /// Flat amount; `base` is not used.
    Fixed,
    /// Multiple of the base reference amount held in `base`.
    BrvMultiple,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLine {
    pub kind: PaymentKind,
    pub name: String,
    /// Amount, weight or quantity the rate was applied to.
    pub base: Decimal,
    pub rate: Option<Decimal>,
    pub rate_kind: RateKind,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PaymentLine {
    pub fn new(kind: PaymentKind, base: Decimal, rate: Option<Decimal>, rate_kind: RateKind, amount: Money) -> Self {
        Self {
            kind,
            name: kind.label().to_string(),
            base,
            rate,
            rate_kind,
            amount,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
