//! Read-only reference data consumed by a calculation.
//!
//! The calculator never writes through this interface. Implementations must
//! present one consistent snapshot for the lifetime of a borrow, which lets
//! any number of calculations share a catalog across threads.

pub mod memory;
pub mod model;

use chrono::NaiveDate;

pub use memory::{CatalogSnapshot, InMemoryCatalog};
pub use model::*;

pub trait ReferenceCatalog: Send + Sync {
    /// All classification entries, in no particular order.
    fn classifications(&self) -> &[ClassificationEntry];

    fn classification(&self, id: ClassificationId) -> Option<&ClassificationEntry>;

    fn classification_by_code(&self, code: &str) -> Option<&ClassificationEntry>;

    /// Entries whose code starts with `prefix`, in ascending code order.
    fn classifications_with_prefix(&self, prefix: &str) -> Vec<&ClassificationEntry> {
        let mut found: Vec<&ClassificationEntry> = self
            .classifications()
            .iter()
            .filter(|e| e.code.starts_with(prefix))
            .collect();
        found.sort_by(|a, b| a.code.cmp(&b.code));
        found
    }

    /// Direct children of an entry, in ascending code order.
    fn children(&self, id: ClassificationId) -> Vec<&ClassificationEntry> {
        let mut found: Vec<&ClassificationEntry> = self
            .classifications()
            .iter()
            .filter(|e| e.parent_id == Some(id))
            .collect();
        found.sort_by(|a, b| a.code.cmp(&b.code));
        found
    }

    fn tariff(&self, id: ClassificationId) -> Option<&TariffRecord>;

    /// Exact-code tariff lookup.
    fn tariff_by_code(&self, code: &str) -> Option<&TariffRecord> {
        self.classification_by_code(code)
            .and_then(|entry| self.tariff(entry.id))
    }

    fn free_trade_entry(&self, country_code: &str) -> Option<&FreeTradeEntry>;

    fn is_free_trade(&self, country_code: &str) -> bool {
        self.free_trade_entry(country_code).is_some()
    }

    /// The BRV whose validity window contains `on`.
    fn current_brv(&self, on: NaiveDate) -> Option<&BrvRate>;

    fn exchange_rate_on(&self, currency: &str, on: NaiveDate) -> Option<&ExchangeRate>;

    /// Most recent rate ever recorded for the currency.
    fn latest_exchange_rate(&self, currency: &str) -> Option<&ExchangeRate>;

    fn excise_rules(&self) -> &[ExciseRule];

    fn utilization_bands(&self) -> &[UtilizationBand];
}
