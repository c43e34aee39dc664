use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Coefficient, Money};

/// One row of the processing-fee schedule: customs values up to and including
/// `upper_bound_usd` pay `coefficient` × BRV. The last row has no bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBand {
    #[serde(default)]
    pub upper_bound_usd: Option<Money>,
    pub coefficient: Coefficient,
}

impl FeeBand {
    fn up_to(bound: Money, coefficient: Coefficient) -> Self {
        Self {
            upper_bound_usd: Some(bound),
            coefficient,
        }
    }
}

/// Standard processing-fee schedule, BRV coefficient by customs value in USD.
pub fn default_fee_bands() -> Vec<FeeBand> {
    vec![
        FeeBand::up_to(dec!(1000), dec!(0.3)),
        FeeBand::up_to(dec!(5000), dec!(0.5)),
        FeeBand::up_to(dec!(10000), dec!(1.0)),
        FeeBand::up_to(dec!(20000), dec!(1.5)),
        FeeBand::up_to(dec!(50000), dec!(3.0)),
        FeeBand::up_to(dec!(100000), dec!(5.0)),
        FeeBand {
            upper_bound_usd: None,
            coefficient: dec!(10.0),
        },
    ]
}

/// Coefficient of the first band covering `customs_value_usd`.
pub fn fee_coefficient(bands: &[FeeBand], customs_value_usd: Money) -> Option<Coefficient> {
    bands
        .iter()
        .find(|band| {
            band.upper_bound_usd
                .map_or(true, |bound| customs_value_usd <= bound)
        })
        .map(|band| band.coefficient)
}
