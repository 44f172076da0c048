//! # evsa-core: EV Station Allocation Data Model
//!
//! Provides the fundamental data structures shared across the EVSA workspace:
//! the scenario input contract, dense zone-pair matrices, typed zone
//! identifiers, and the unified error type.
//!
//! ## Design Philosophy
//!
//! Zones are atomic geographic units addressed by index `0..zones-1`. All
//! per-zone quantities (EV population, charging demand, allocated posts) are
//! plain vectors in zone order, and all pair quantities (distance,
//! congestion) are dense [`SquareMatrix`] tables. A run's inputs are captured
//! once in a [`Scenario`] and stay immutable while the optimizer iterates.
//!
//! ## Quick Start
//!
//! ```
//! use evsa_core::Scenario;
//!
//! let scenario = Scenario::from_json(r#"{
//!     "zones": 2,
//!     "budget": 10.0,
//!     "evs_per_zone": [100, 100],
//!     "distances": [[0.0, 5.0], [5.0, 0.0]],
//!     "congestion": [[0.0, 0.5], [0.5, 0.0]],
//!     "charge_station_proportion": 0.1,
//!     "peak_hour_proportion": 0.1,
//!     "serving_rate": 6.0,
//!     "lambda_coef": 0.2
//! }"#).unwrap();
//!
//! assert_eq!(scenario.zones, 2);
//! assert_eq!(scenario.label(0), "Zone 1");
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub mod matrix;
pub mod scenario;

pub use error::{EvsaError, EvsaResult};
pub use matrix::SquareMatrix;
pub use scenario::Scenario;

// Newtype wrapper for zone indices for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(usize);

impl ZoneId {
    #[inline]
    pub fn new(value: usize) -> Self {
        ZoneId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ZoneId {
    /// Zones display 1-based, matching report labels.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone {}", self.0 + 1)
    }
}
