//! Scenario input model.
//!
//! A [`Scenario`] is the single structured-input contract for one allocation
//! run: every parameter the optimizer needs, captured once and immutable for
//! the duration of the run. Scenario files are plain JSON and replace any
//! interactive, per-value parameter collection at the boundary.
//!
//! Shape and parameter-range checks live with the optimizer's problem
//! builder, which validates eagerly before any solve attempt. The methods
//! here only cover loading and labeling.

use serde::{Deserialize, Serialize};

use crate::{EvsaResult, SquareMatrix};

/// Complete input set for one charging-station allocation run.
///
/// All quantities are aggregated per geographic zone; zones are identified
/// by index `0..zones-1` throughout the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Number of zones under analysis (>= 1).
    pub zones: usize,

    /// Total number of charging posts to distribute across all zones.
    ///
    /// Held as an equality constraint during the search. Must be >= `zones`
    /// since every zone is guaranteed at least one post.
    pub budget: f64,

    /// Estimated EV population per zone.
    pub evs_per_zone: Vec<u64>,

    /// Inter-zone distances (km). Zero diagonal; asymmetric entries allowed
    /// (the i->j distance need not equal j->i).
    pub distances: SquareMatrix,

    /// Inter-zone congestion levels. Zero diagonal; conventionally in
    /// `[0, 1]` but not enforced.
    pub congestion: SquareMatrix,

    /// Proportion of EVs that charge at public stations rather than at home.
    pub charge_station_proportion: f64,

    /// Proportion of EVs charging during the peak hour.
    ///
    /// Carried for interface parity with the legacy input set; the cost
    /// formula does not consume it. See DESIGN.md.
    pub peak_hour_proportion: f64,

    /// EVs one charging post serves per unit time (> 0).
    pub serving_rate: f64,

    /// Linear scaling of the travel-time contribution to social cost.
    pub lambda_coef: f64,

    /// Optional display names for zones, one per zone when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_names: Option<Vec<String>>,
}

impl Scenario {
    /// Parse a scenario from a JSON string.
    pub fn from_json(json: &str) -> EvsaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Display label for zone `index`.
    ///
    /// Uses the scenario's `zone_names` entry when present, otherwise the
    /// 1-based "Zone N" convention used in reports.
    pub fn label(&self, index: usize) -> String {
        match &self.zone_names {
            Some(names) if index < names.len() => names[index].clone(),
            _ => format!("Zone {}", index + 1),
        }
    }
}
