use serde::{Deserialize, Serialize};

use crate::catalog::ReferenceCatalog;
use crate::config::CalculatorConfig;
use crate::types::Advised;

/// Duty column applied to a shipment, decided from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyRegime {
    /// Regional-bloc partner: preferential column as published.
    PreferentialPartner,
    /// Any other known origin: standard column.
    Standard,
    /// Free-trade partner with an origin certificate: zero duty.
    FreeTrade,
    /// Origin not declared: preferential column doubled.
    UnknownOrigin,
    /// Reserved for benefit-based reductions; never produced by
    /// [`classify_regime`].
    Preferential,
}

impl std::fmt::Display for DutyRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DutyRegime::PreferentialPartner => write!(f, "Preferential partner"),
            DutyRegime::Standard => write!(f, "Standard"),
            DutyRegime::FreeTrade => write!(f, "Free trade"),
            DutyRegime::UnknownOrigin => write!(f, "Unknown origin"),
            DutyRegime::Preferential => write!(f, "Preferential"),
        }
    }
}

/// Decide the duty regime for an origin country.
///
/// A free-trade partner without a certificate does not short-circuit: a
/// warning is raised and the origin is classified as if it had no agreement,
/// landing in the preferential-partner or standard column.
pub fn classify_regime<C>(
    catalog: &C,
    config: &CalculatorConfig,
    origin: &str,
    has_certificate: bool,
) -> Advised<DutyRegime>
where
    C: ReferenceCatalog + ?Sized,
{
    if config.is_unknown_origin(origin) {
        return Advised::clean(DutyRegime::UnknownOrigin);
    }

    let origin = origin.trim().to_ascii_uppercase();
    let mut warnings = Vec::new();

    if let Some(fta) = catalog.free_trade_entry(&origin) {
        if has_certificate {
            return Advised::clean(DutyRegime::FreeTrade);
        }
        let agreement = fta
            .agreement
            .as_deref()
            .map(|a| format!(" ({})", a))
            .unwrap_or_default();
        warnings.push(format!(
            "{} is a free-trade partner{} but no origin certificate was provided; \
             regular duty rates apply",
            origin, agreement
        ));
    }

    let regime = if config.is_preferential_partner(&origin) {
        DutyRegime::PreferentialPartner
    } else {
        DutyRegime::Standard
    };

    Advised {
        value: regime,
        warnings,
    }
}
