//! Classification lookups over the goods nomenclature: hierarchical tariff
//! resolution for the calculator and prefix/description search for
//! front-ends.

pub mod resolver;
pub mod search;

pub use resolver::{lineage, resolve_classification, Resolution, TariffSource};
pub use search::{search_classifications, ClassificationHit, SearchOutput, DEFAULT_SEARCH_LIMIT};
