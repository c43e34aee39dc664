use serde::{Deserialize, Serialize};

use crate::catalog::UtilizationBand;

/// Physical attributes of a vehicle relevant to the utilization fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAttributes {
    pub engine_volume_cc: Option<u32>,
    pub vehicle_age_years: Option<u32>,
}

impl VehicleAttributes {
    pub fn is_empty(&self) -> bool {
        self.engine_volume_cc.is_none() && self.vehicle_age_years.is_none()
    }
}

fn within(value: u32, min: Option<u32>, max: Option<u32>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

/// A band's attribute constraints against what the declarant supplied. A
/// constrained attribute that was not supplied disqualifies the band.
fn fits(band: &UtilizationBand, vehicle: &VehicleAttributes) -> bool {
    let volume_ok = !band.constrains_engine_volume()
        || vehicle
            .engine_volume_cc
            .map_or(false, |v| within(v, band.engine_volume_min, band.engine_volume_max));
    let age_ok = !band.constrains_vehicle_age()
        || vehicle
            .vehicle_age_years
            .map_or(false, |a| within(a, band.vehicle_age_min, band.vehicle_age_max));
    volume_ok && age_ok
}

/// A band applies at `prefix` when it is keyed on exactly that prefix, or
/// when its explicit code range contains the full code.
fn covers(band: &UtilizationBand, prefix: &str, code: &str) -> bool {
    match band.code_end.as_deref() {
        None => band.code_start == prefix,
        Some(end) => band.code_start.as_str() <= code && code <= end,
    }
}

/// Select the utilization band for a vehicle code.
///
/// Prefixes of `code` are tried longest first. At the first prefix with any
/// candidate bands: with no attributes supplied the first candidate is taken;
/// otherwise the first candidate whose engine-volume and age bounds all hold.
/// When no candidate fits, shorter prefixes are tried.
pub fn select_utilization_band<'a>(
    bands: &'a [UtilizationBand],
    code: &str,
    vehicle: &VehicleAttributes,
) -> Option<&'a UtilizationBand> {
    for len in (1..=code.len()).rev() {
        let Some(prefix) = code.get(..len) else {
            continue;
        };
        let mut candidates = bands.iter().filter(|b| covers(b, prefix, code)).peekable();
        if candidates.peek().is_none() {
            continue;
        }
        if vehicle.is_empty() {
            return candidates.next();
        }
        if let Some(band) = candidates.find(|b| fits(b, vehicle)) {
            return Some(band);
        }
    }
    None
}
