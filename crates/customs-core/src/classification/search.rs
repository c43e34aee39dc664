use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::catalog::{ClassificationEntry, ReferenceCatalog};
use crate::error::CustomsError;
use crate::types::{with_metadata, ComputationOutput};
use crate::CustomsResult;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationHit {
    pub code: String,
    pub description: String,
    pub level: u8,
    pub has_tariff: bool,
    pub child_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutput {
    pub query: String,
    pub hits: Vec<ClassificationHit>,
}

/// Look up classification entries for an autocomplete-style query.
///
/// A purely numeric query matches code prefixes only, shortest codes first.
/// Anything else also matches descriptions (case-insensitive), with code
/// matches ranked ahead of description matches.
pub fn search_classifications<C>(
    catalog: &C,
    query: &str,
    limit: usize,
) -> CustomsResult<ComputationOutput<SearchOutput>>
where
    C: ReferenceCatalog + ?Sized,
{
    let start = Instant::now();
    let query = query.trim();

    if query.is_empty() {
        return Err(CustomsError::invalid("query", "Search query must not be empty"));
    }
    if limit == 0 {
        return Err(CustomsError::invalid("limit", "Limit must be at least 1"));
    }

    let numeric = query.chars().all(|c| c.is_ascii_digit());
    let mut matches: Vec<(bool, &ClassificationEntry)> = if numeric {
        catalog
            .classifications_with_prefix(query)
            .into_iter()
            .map(|e| (true, e))
            .collect()
    } else {
        let needle = query.to_lowercase();
        catalog
            .classifications()
            .iter()
            .filter_map(|e| {
                if e.code.starts_with(query) {
                    Some((true, e))
                } else if e.description.to_lowercase().contains(&needle) {
                    Some((false, e))
                } else {
                    None
                }
            })
            .collect()
    };

    // code hits first, then shorter (more general) codes, then code order
    matches.sort_by(|(a_code, a), (b_code, b)| {
        b_code
            .cmp(a_code)
            .then(a.code.len().cmp(&b.code.len()))
            .then(a.code.cmp(&b.code))
    });

    let hits: Vec<ClassificationHit> = matches
        .into_iter()
        .take(limit)
        .map(|(_, e)| ClassificationHit {
            code: e.code.clone(),
            description: e.description.clone(),
            level: e.level,
            has_tariff: catalog.tariff(e.id).is_some(),
            child_count: catalog.children(e.id).len(),
        })
        .collect();

    let result = SearchOutput {
        query: query.to_string(),
        hits,
    };

    let assumptions = serde_json::json!({
        "query": query,
        "numeric_query": numeric,
        "limit": limit,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Classification search by code prefix and description",
        &assumptions,
        Vec::new(),
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, ClassificationId, InMemoryCatalog};

    fn entry(id: u32, code: &str, desc: &str, parent: Option<u32>) -> ClassificationEntry {
        ClassificationEntry {
            id: ClassificationId(id),
            code: code.to_string(),
            description: desc.to_string(),
            level: code.len() as u8,
            parent_id: parent.map(ClassificationId),
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(CatalogSnapshot {
            classifications: vec![
                entry(1, "56", "Wadding, felt and nonwovens", None),
                entry(2, "5601", "Wadding of textile materials", Some(1)),
                entry(3, "5602", "Felt", Some(1)),
                entry(4, "560110", "Sanitary towels of wadding", Some(2)),
                entry(5, "87", "Vehicles other than railway", None),
                entry(6, "8703", "Motor cars for transport of persons", Some(5)),
            ],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_numeric_query_shortest_first() {
        let out = search_classifications(&catalog(), "56", 10).unwrap();
        let codes: Vec<&str> = out.result.hits.iter().map(|h| h.code.as_str()).collect();
        assert_eq!(codes, vec!["56", "5601", "5602", "560110"]);
        assert_eq!(out.result.hits[0].child_count, 2);
        assert!(!out.result.hits[0].has_tariff);
    }

    #[test]
    fn test_limit_truncates() {
        let out = search_classifications(&catalog(), "56", 2).unwrap();
        assert_eq!(out.result.hits.len(), 2);
    }

    #[test]
    fn test_text_query_matches_descriptions() {
        let out = search_classifications(&catalog(), "  WADDING ", 10).unwrap();
        let codes: Vec<&str> = out.result.hits.iter().map(|h| h.code.as_str()).collect();
        assert_eq!(codes, vec!["56", "5601", "560110"]);
        assert_eq!(out.result.query, "WADDING");
    }

    #[test]
    fn test_empty_query_rejected() {
        match search_classifications(&catalog(), "   ", 10) {
            Err(CustomsError::InvalidInput { field, .. }) => assert_eq!(field, "query"),
            other => panic!("Expected InvalidInput, got {:?}", other.map(|o| o.result)),
        }
    }
}
