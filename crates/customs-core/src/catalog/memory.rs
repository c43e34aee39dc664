//! In-memory catalog built from a serialised snapshot.
//!
//! Classification entries live in a single arena (`Vec`) and are addressed by
//! position; id, code and child indexes are derived once at load time.
//! Inactive rows are dropped during load, so every query sees active data only.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::*;
use super::ReferenceCatalog;
use crate::error::CustomsError;
use crate::CustomsResult;

/// Wire form of a complete reference-data snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub classifications: Vec<ClassificationEntry>,
    #[serde(default)]
    pub tariffs: Vec<TariffRecord>,
    #[serde(default)]
    pub excise_rules: Vec<ExciseRule>,
    #[serde(default)]
    pub utilization_bands: Vec<UtilizationBand>,
    #[serde(default)]
    pub free_trade: Vec<FreeTradeEntry>,
    #[serde(default)]
    pub brv_rates: Vec<BrvRate>,
    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRate>,
}

#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    entries: Vec<ClassificationEntry>,
    by_id: HashMap<ClassificationId, usize>,
    by_code: BTreeMap<String, usize>,
    children: Vec<Vec<usize>>,
    tariffs: HashMap<ClassificationId, TariffRecord>,
    excise_rules: Vec<ExciseRule>,
    utilization_bands: Vec<UtilizationBand>,
    free_trade: HashMap<String, FreeTradeEntry>,
    /// Sorted by `valid_from`, newest first.
    brv_rates: Vec<BrvRate>,
    /// Per currency, sorted by date ascending.
    exchange_rates: HashMap<String, Vec<ExchangeRate>>,
}

impl InMemoryCatalog {
    pub fn from_json(json: &str) -> CustomsResult<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Build the catalog, rejecting snapshots that break the reference-data
    /// invariants (unique codes, resolvable parents, one tariff per entry).
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> CustomsResult<Self> {
        let CatalogSnapshot {
            classifications,
            tariffs,
            excise_rules,
            utilization_bands,
            free_trade,
            brv_rates,
            exchange_rates,
        } = snapshot;

        let mut by_id = HashMap::with_capacity(classifications.len());
        let mut by_code = BTreeMap::new();
        for (idx, entry) in classifications.iter().enumerate() {
            if entry.code.is_empty() || !entry.code.chars().all(|c| c.is_ascii_digit()) {
                return Err(CustomsError::Catalog(format!(
                    "classification {:?} has a non-numeric code '{}'",
                    entry.id, entry.code
                )));
            }
            if by_id.insert(entry.id, idx).is_some() {
                return Err(CustomsError::Catalog(format!(
                    "duplicate classification id {:?}",
                    entry.id
                )));
            }
            if by_code.insert(entry.code.clone(), idx).is_some() {
                return Err(CustomsError::Catalog(format!(
                    "duplicate classification code '{}'",
                    entry.code
                )));
            }
        }

        let mut children = vec![Vec::new(); classifications.len()];
        for (idx, entry) in classifications.iter().enumerate() {
            if let Some(parent) = entry.parent_id {
                let parent_idx = *by_id.get(&parent).ok_or_else(|| {
                    CustomsError::Catalog(format!(
                        "classification '{}' references missing parent {:?}",
                        entry.code, parent
                    ))
                })?;
                children[parent_idx].push(idx);
            }
        }
        check_acyclic(&classifications, &by_id)?;
        for list in children.iter_mut() {
            list.sort_by(|a, b| classifications[*a].code.cmp(&classifications[*b].code));
        }

        let mut tariff_map = HashMap::with_capacity(tariffs.len());
        for tariff in tariffs {
            if !by_id.contains_key(&tariff.classification_id) {
                return Err(CustomsError::Catalog(format!(
                    "tariff references missing classification {:?}",
                    tariff.classification_id
                )));
            }
            let id = tariff.classification_id;
            if tariff_map.insert(id, tariff).is_some() {
                return Err(CustomsError::Catalog(format!(
                    "classification {:?} has more than one tariff record",
                    id
                )));
            }
        }

        let free_trade: HashMap<String, FreeTradeEntry> = free_trade
            .into_iter()
            .filter(|f| f.is_active)
            .map(|f| (f.country_code.trim().to_ascii_uppercase(), f))
            .collect();

        let mut brv_rates: Vec<BrvRate> = brv_rates.into_iter().filter(|b| b.is_active).collect();
        brv_rates.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));

        let mut rates_by_currency: HashMap<String, Vec<ExchangeRate>> = HashMap::new();
        for rate in exchange_rates.into_iter().filter(|r| r.is_active) {
            if rate.rate <= dec!(0) {
                return Err(CustomsError::Catalog(format!(
                    "exchange rate for {} on {} must be positive",
                    rate.currency, rate.date
                )));
            }
            rates_by_currency
                .entry(rate.currency.trim().to_ascii_uppercase())
                .or_default()
                .push(rate);
        }
        for (currency, series) in rates_by_currency.iter_mut() {
            series.sort_by_key(|r| r.date);
            if series.windows(2).any(|w| w[0].date == w[1].date) {
                return Err(CustomsError::Catalog(format!(
                    "duplicate exchange rate dates for {}",
                    currency
                )));
            }
        }

        let excise_rules: Vec<ExciseRule> =
            excise_rules.into_iter().filter(|r| r.is_active).collect();
        let utilization_bands: Vec<UtilizationBand> =
            utilization_bands.into_iter().filter(|b| b.is_active).collect();

        info!(
            classifications = classifications.len(),
            tariffs = tariff_map.len(),
            excise_rules = excise_rules.len(),
            utilization_bands = utilization_bands.len(),
            currencies = rates_by_currency.len(),
            "reference catalog loaded"
        );

        Ok(Self {
            entries: classifications,
            by_id,
            by_code,
            children,
            tariffs: tariff_map,
            excise_rules,
            utilization_bands,
            free_trade,
            brv_rates,
            exchange_rates: rates_by_currency,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Follow parent links from every entry; a chain longer than the arena means
/// a cycle.
fn check_acyclic(
    entries: &[ClassificationEntry],
    by_id: &HashMap<ClassificationId, usize>,
) -> CustomsResult<()> {
    for entry in entries {
        let mut steps = 0;
        let mut cursor = entry.parent_id;
        while let Some(parent) = cursor {
            steps += 1;
            if steps > entries.len() {
                return Err(CustomsError::Catalog(format!(
                    "classification '{}' is part of a parent cycle",
                    entry.code
                )));
            }
            cursor = by_id.get(&parent).and_then(|i| entries[*i].parent_id);
        }
    }
    Ok(())
}

impl ReferenceCatalog for InMemoryCatalog {
    fn classifications(&self) -> &[ClassificationEntry] {
        &self.entries
    }

    fn classification(&self, id: ClassificationId) -> Option<&ClassificationEntry> {
        self.by_id.get(&id).map(|i| &self.entries[*i])
    }

    fn classification_by_code(&self, code: &str) -> Option<&ClassificationEntry> {
        self.by_code.get(code).map(|i| &self.entries[*i])
    }

    fn classifications_with_prefix(&self, prefix: &str) -> Vec<&ClassificationEntry> {
        self.by_code
            .range(prefix.to_string()..)
            .take_while(|(code, _)| code.starts_with(prefix))
            .map(|(_, i)| &self.entries[*i])
            .collect()
    }

    fn children(&self, id: ClassificationId) -> Vec<&ClassificationEntry> {
        self.by_id
            .get(&id)
            .map(|i| self.children[*i].iter().map(|c| &self.entries[*c]).collect())
            .unwrap_or_default()
    }

    fn tariff(&self, id: ClassificationId) -> Option<&TariffRecord> {
        self.tariffs.get(&id)
    }

    fn free_trade_entry(&self, country_code: &str) -> Option<&FreeTradeEntry> {
        self.free_trade
            .get(&country_code.trim().to_ascii_uppercase())
    }

    fn current_brv(&self, on: NaiveDate) -> Option<&BrvRate> {
        self.brv_rates.iter().find(|b| b.is_current_on(on))
    }

    fn exchange_rate_on(&self, currency: &str, on: NaiveDate) -> Option<&ExchangeRate> {
        self.exchange_rates
            .get(&currency.trim().to_ascii_uppercase())
            .and_then(|series| series.iter().find(|r| r.date == on))
    }

    fn latest_exchange_rate(&self, currency: &str) -> Option<&ExchangeRate> {
        self.exchange_rates
            .get(&currency.trim().to_ascii_uppercase())
            .and_then(|series| series.last())
    }

    fn excise_rules(&self) -> &[ExciseRule] {
        &self.excise_rules
    }

    fn utilization_bands(&self) -> &[UtilizationBand] {
        &self.utilization_bands
    }
}
