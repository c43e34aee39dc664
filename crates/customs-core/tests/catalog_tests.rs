use chrono::NaiveDate;
use customs_core::calculator::{calculate_customs, CalculationInput};
use customs_core::catalog::{ClassificationId, ReferenceCatalog};
use customs_core::classification::{search_classifications, DEFAULT_SEARCH_LIMIT};
use customs_core::{CalculatorConfig, CustomsError, InMemoryCatalog};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const CATALOG: &str = include_str!("fixtures/catalog.json");

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_json(CATALOG).unwrap()
}

// ===========================================================================
// Snapshot loading
// ===========================================================================

#[test]
fn test_fixture_loads_with_indexes() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 15);

    let chapter = catalog.classification_by_code("22").unwrap();
    let children: Vec<&str> = catalog
        .children(chapter.id)
        .into_iter()
        .map(|e| e.code.as_str())
        .collect();
    assert_eq!(children, vec!["2202", "2203"]);

    assert!(catalog.tariff_by_code("2202100000").is_some());
    assert!(catalog.tariff_by_code("2203").is_none());
    assert!(catalog.is_free_trade("kz"));
    assert_eq!(catalog.excise_rules().len(), 3);
    assert_eq!(catalog.utilization_bands().len(), 4);
}

#[test]
fn test_current_brv_by_date() {
    let catalog = catalog();
    let brv = catalog
        .current_brv(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
        .unwrap();
    assert_eq!(brv.amount, dec!(340000));
    assert!(catalog
        .current_brv(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        .is_none());
}

#[test]
fn test_malformed_snapshot_is_serialization_error() {
    match InMemoryCatalog::from_json("{\"classifications\": 7}").unwrap_err() {
        CustomsError::SerializationError(_) => {}
        other => panic!("Expected SerializationError, got {:?}", other),
    }
}

#[test]
fn test_dangling_parent_rejected() {
    let json = r#"{"classifications": [
        {"id": 1, "code": "2202", "description": "Waters", "level": 2, "parent_id": 99}
    ]}"#;
    match InMemoryCatalog::from_json(json).unwrap_err() {
        CustomsError::Catalog(msg) => assert!(msg.contains("missing parent")),
        other => panic!("Expected Catalog error, got {:?}", other),
    }
}

#[test]
fn test_classification_lookup_by_id() {
    let catalog = catalog();
    let entry = catalog.classification(ClassificationId(13)).unwrap();
    assert_eq!(entry.code, "8703231000");
}

// ===========================================================================
// Search
// ===========================================================================

#[test]
fn test_numeric_search_orders_general_codes_first() {
    let out = search_classifications(&catalog(), "22", DEFAULT_SEARCH_LIMIT).unwrap();
    let codes: Vec<&str> = out.result.hits.iter().map(|h| h.code.as_str()).collect();
    assert_eq!(
        codes,
        vec!["22", "2202", "2203", "2202100000", "2202990000", "2203000100"]
    );
    assert_eq!(out.result.hits[0].child_count, 2);
    assert!(!out.result.hits[0].has_tariff);
}

#[test]
fn test_text_search_matches_descriptions() {
    let out = search_classifications(&catalog(), "beer", DEFAULT_SEARCH_LIMIT).unwrap();
    let codes: Vec<&str> = out.result.hits.iter().map(|h| h.code.as_str()).collect();
    assert_eq!(codes, vec!["2203", "2203000100"]);
    assert!(out.result.hits[1].has_tariff);
}

#[test]
fn test_search_respects_limit() {
    let out = search_classifications(&catalog(), "2", 2).unwrap();
    assert_eq!(out.result.hits.len(), 2);
}

#[test]
fn test_empty_query_rejected() {
    match search_classifications(&catalog(), "  ", 5).unwrap_err() {
        CustomsError::InvalidInput { field, .. } => assert_eq!(field, "query"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

// ===========================================================================
// Sharing
// ===========================================================================

#[test]
fn test_catalog_shared_across_threads() {
    let catalog = catalog();
    let config = CalculatorConfig::default();

    let totals: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = ["RU", "CN", "XX", "KZ"]
            .into_iter()
            .map(|origin| {
                let catalog = &catalog;
                let config = &config;
                s.spawn(move || {
                    let mut input = CalculationInput::new("2202100000", dec!(100));
                    input.weight_kg = dec!(1000);
                    input.origin_country = origin.to_string();
                    input.calculation_date = NaiveDate::from_ymd_opt(2025, 3, 10);
                    calculate_customs(catalog, &input, config).unwrap().result.total_local
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(totals[0], dec!(899948));
    assert_eq!(totals[2], dec!(1245356));
    assert_eq!(totals.len(), 4);
}
