//! Banded and prefix-matched rate lookups used by the payment stages.

pub mod excise;
pub mod fee_band;
pub mod utilization;

use crate::catalog::BrvRate;
use crate::types::Money;

pub use excise::{best_excise_rule, ExciseMatch};
pub use fee_band::{default_fee_bands, fee_coefficient, FeeBand};
pub use utilization::{select_utilization_band, VehicleAttributes};

/// Base reference amount for a stage, and whether it had to fall back to the
/// configured constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrvAmount {
    pub amount: Money,
    pub is_fallback: bool,
}

pub fn brv_or_fallback(current: Option<&BrvRate>, fallback: Money) -> BrvAmount {
    match current {
        Some(brv) => BrvAmount {
            amount: brv.amount,
            is_fallback: false,
        },
        None => BrvAmount {
            amount: fallback,
            is_fallback: true,
        },
    }
}
