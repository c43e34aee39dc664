use serde::{Deserialize, Serialize};

use crate::catalog::{ClassificationEntry, ReferenceCatalog, TariffRecord};
use crate::error::CustomsError;
use crate::types::Advised;
use crate::CustomsResult;

/// Where the tariff applied to a code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffSource {
    /// The code's own tariff record.
    Exact,
    /// The first more specific code (lexicographically) carrying a duty rate.
    Descendant,
    /// The nearest truncation of the code carrying a duty rate.
    Ancestor,
}

/// A classification entry together with the tariff that governs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub entry: &'a ClassificationEntry,
    pub tariff: &'a TariffRecord,
    /// Code of the entry that owns `tariff`; differs from `entry.code`
    /// unless `source` is `Exact`.
    pub tariff_code: &'a str,
    pub source: TariffSource,
}

/// Resolve a classification code to its entry and the most specific tariff
/// available for it.
///
/// Search order: the code's own record, then descendants (longer codes with
/// the same prefix, smallest first), then ancestors obtained by dropping one
/// trailing digit at a time down to `min_ancestor_len`. A substituted tariff
/// raises a warning. Finding nothing is fatal; there is no zero-rate default.
pub fn resolve_classification<'a, C>(
    catalog: &'a C,
    code: &str,
    min_ancestor_len: usize,
) -> CustomsResult<Advised<Resolution<'a>>>
where
    C: ReferenceCatalog + ?Sized,
{
    let not_found = || CustomsError::ClassificationNotFound {
        code: code.to_string(),
    };

    let entry = catalog.classification_by_code(code).ok_or_else(not_found)?;

    if let Some(tariff) = catalog.tariff(entry.id).filter(|t| t.has_duty()) {
        return Ok(Advised::clean(Resolution {
            entry,
            tariff,
            tariff_code: &entry.code,
            source: TariffSource::Exact,
        }));
    }

    let descendant = catalog
        .classifications_with_prefix(code)
        .into_iter()
        .filter(|e| e.code.len() > code.len())
        .find_map(|e| {
            catalog
                .tariff(e.id)
                .filter(|t| t.has_ad_valorem_duty())
                .map(|t| (e, t))
        });

    if let Some((owner, tariff)) = descendant {
        return Ok(Advised::clean(Resolution {
            entry,
            tariff,
            tariff_code: &owner.code,
            source: TariffSource::Descendant,
        })
        .with_warning(format!(
            "No exact tariff for {}; using the rate of more specific code {}",
            code, owner.code
        )));
    }

    for len in (min_ancestor_len..code.len()).rev() {
        let Some(prefix) = code.get(..len) else {
            continue;
        };
        let found = catalog.classification_by_code(prefix).and_then(|owner| {
            catalog
                .tariff(owner.id)
                .filter(|t| t.has_ad_valorem_duty())
                .map(|t| (owner, t))
        });
        if let Some((owner, tariff)) = found {
            return Ok(Advised::clean(Resolution {
                entry,
                tariff,
                tariff_code: &owner.code,
                source: TariffSource::Ancestor,
            })
            .with_warning(format!(
                "No exact tariff for {}; using the rate of parent code {}",
                code, owner.code
            )));
        }
    }

    Err(not_found())
}

/// Ancestor chain of an entry, root first, ending with the entry itself.
pub fn lineage<'a, C>(catalog: &'a C, entry: &'a ClassificationEntry) -> Vec<&'a ClassificationEntry>
where
    C: ReferenceCatalog + ?Sized,
{
    let limit = catalog.classifications().len();
    let mut chain = vec![entry];
    let mut cursor = entry.parent_id;
    while let Some(parent_id) = cursor {
        if chain.len() > limit {
            break;
        }
        match catalog.classification(parent_id) {
            Some(parent) => {
                chain.push(parent);
                cursor = parent.parent_id;
            }
            None => break,
        }
    }
    chain.reverse();
    chain
}
