use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Coefficient, Money, Percent};

fn active() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Classification tree
// ---------------------------------------------------------------------------

/// Stable identifier of a classification entry inside a catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationId(pub u32);

/// One node of the goods nomenclature. Parent links are ids, never owned
/// references; children are derived by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub id: ClassificationId,
    pub code: String,
    pub description: String,
    pub level: u8,
    #[serde(default)]
    pub parent_id: Option<ClassificationId>,
}

// ---------------------------------------------------------------------------
// Tariff
// ---------------------------------------------------------------------------

/// Duty, excise and VAT rates attached to a single classification entry.
///
/// Duty is published in two columns: the preferential-partner column and the
/// standard (non-partner) column. Specific duty is expressed in USD per kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    pub classification_id: ClassificationId,
    #[serde(default)]
    pub duty_percent: Option<Percent>,
    #[serde(default)]
    pub duty_percent_standard: Option<Percent>,
    #[serde(default)]
    pub duty_specific: Option<Money>,
    #[serde(default)]
    pub duty_specific_standard: Option<Money>,
    #[serde(default)]
    pub specific_unit: Option<String>,
    #[serde(default)]
    pub excise_percent: Option<Percent>,
    #[serde(default)]
    pub excise_specific: Option<Money>,
    #[serde(default)]
    pub vat_percent: Option<Percent>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl TariffRecord {
    pub fn has_duty(&self) -> bool {
        self.duty_percent.is_some()
            || self.duty_percent_standard.is_some()
            || self.duty_specific.is_some()
            || self.duty_specific_standard.is_some()
    }

    pub fn has_ad_valorem_duty(&self) -> bool {
        self.duty_percent.is_some()
    }
}

// ---------------------------------------------------------------------------
// Excise
// ---------------------------------------------------------------------------

/// Unit a specific excise rate is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExciseUnit {
    PerThousandUnits,
    PerUnit,
    PerLiter,
    PerKilogram,
    PerTonne,
    PerMilliliter,
    Unrecognized,
}

impl ExciseUnit {
    /// Parse the free-text unit tag used by the published schedule
    /// (e.g. `sum/1000pcs`, `sum/liter`). Checks run from most to least
    /// specific so `1000pcs` is not mistaken for `pcs`.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        if tag.contains("1000pcs") {
            ExciseUnit::PerThousandUnits
        } else if tag.contains("pcs") {
            ExciseUnit::PerUnit
        } else if tag.contains("liter") {
            ExciseUnit::PerLiter
        } else if tag.contains("kg") {
            ExciseUnit::PerKilogram
        } else if tag.contains("ton") {
            ExciseUnit::PerTonne
        } else if tag.contains("ml") {
            ExciseUnit::PerMilliliter
        } else {
            ExciseUnit::Unrecognized
        }
    }
}

impl std::fmt::Display for ExciseUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExciseUnit::PerThousandUnits => write!(f, "per 1000 units"),
            ExciseUnit::PerUnit => write!(f, "per unit"),
            ExciseUnit::PerLiter => write!(f, "per liter"),
            ExciseUnit::PerKilogram => write!(f, "per kg"),
            ExciseUnit::PerTonne => write!(f, "per tonne"),
            ExciseUnit::PerMilliliter => write!(f, "per ml"),
            ExciseUnit::Unrecognized => write!(f, "specific"),
        }
    }
}

/// Excise rate for a category of goods, matched by classification prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExciseRule {
    pub id: u32,
    /// tobacco, alcohol, petroleum, sugar, beverages ...
    pub category: String,
    pub product_name: String,
    #[serde(default)]
    pub product_name_local: Option<String>,
    /// Comma-separated classification prefixes, e.g. `"2402201000,2402209000"`.
    pub codes: String,
    #[serde(default)]
    pub rate_percent: Option<Percent>,
    #[serde(default)]
    pub rate_specific: Option<Money>,
    #[serde(default)]
    pub rate_unit: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl ExciseRule {
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.codes.split(',').map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn unit(&self) -> ExciseUnit {
        ExciseUnit::parse(self.rate_unit.as_deref().unwrap_or(""))
    }

    pub fn display_name(&self) -> &str {
        self.product_name_local
            .as_deref()
            .unwrap_or(&self.product_name)
    }
}

// ---------------------------------------------------------------------------
// Utilization
// ---------------------------------------------------------------------------

/// How a utilization band turns into an amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fee_type", rename_all = "snake_case")]
pub enum FeeFormula {
    Fixed { amount: Money },
    Percent { percent: Percent },
    BrvMultiplier { multiplier: Coefficient },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationBand {
    pub id: u32,
    pub code_start: String,
    #[serde(default)]
    pub code_end: Option<String>,
    #[serde(flatten)]
    pub formula: FeeFormula,
    #[serde(default)]
    pub engine_volume_min: Option<u32>,
    #[serde(default)]
    pub engine_volume_max: Option<u32>,
    #[serde(default)]
    pub vehicle_age_min: Option<u32>,
    #[serde(default)]
    pub vehicle_age_max: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl UtilizationBand {
    pub fn constrains_engine_volume(&self) -> bool {
        self.engine_volume_min.is_some() || self.engine_volume_max.is_some()
    }

    pub fn constrains_vehicle_age(&self) -> bool {
        self.vehicle_age_min.is_some() || self.vehicle_age_max.is_some()
    }
}

// ---------------------------------------------------------------------------
// Origin, BRV, currency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTradeEntry {
    pub country_code: String,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub agreement: Option<String>,
    #[serde(default = "active")]
    pub requires_certificate: bool,
    #[serde(default = "active")]
    pub is_active: bool,
}

/// Yearly base reference amount (BRV) with its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrvRate {
    pub year: i32,
    pub amount: Money,
    pub valid_from: NaiveDate,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl BrvRate {
    pub fn is_current_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && self.valid_until.map_or(true, |until| until >= date)
    }
}

/// Local-currency value of one unit of a foreign currency on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub currency: String,
    pub rate: Decimal,
    pub date: NaiveDate,
    #[serde(default = "active")]
    pub is_active: bool,
}
