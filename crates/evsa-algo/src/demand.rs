//! Charging-demand derivation.
//!
//! First stage of the allocation pipeline: converts raw EV population counts
//! into the per-zone expected charging demand the cost function consumes.
//! The demand vector is computed once per run and never mutated afterwards.

use crate::allocation::AllocationError;

/// Derive per-zone charging demand from EV population counts.
///
/// `demand[i] = evs_per_zone[i] * charge_station_proportion`
///
/// `charge_station_proportion` is the fraction of the EV population expected
/// to charge at public stations rather than at home; it is conventionally in
/// `[0, 1]` but intentionally not range-checked, matching the input contract.
///
/// Pure function with no side effects. The only failure mode is a population
/// vector whose length does not match the zone count.
pub fn charging_demand(
    zones: usize,
    evs_per_zone: &[u64],
    charge_station_proportion: f64,
) -> Result<Vec<f64>, AllocationError> {
    if evs_per_zone.len() != zones {
        return Err(AllocationError::DimensionMismatch {
            what: "evs_per_zone".to_string(),
            expected: zones,
            actual: evs_per_zone.len(),
        });
    }

    Ok(evs_per_zone
        .iter()
        .map(|&evs| evs as f64 * charge_station_proportion)
        .collect())
}
