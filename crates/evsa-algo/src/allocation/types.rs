use std::fmt;

use serde::Serialize;

/// Integerization policy applied to the continuous optimum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RoundingMode {
    /// Independent per-zone rounding to the nearest integer (ties away from
    /// zero). Baseline behavior: the rounded sum may drift from the budget.
    #[default]
    Nearest,
    /// Largest-remainder rounding: floor every zone, then hand the leftover
    /// posts to the zones with the largest fractional parts so the sum
    /// matches the rounded budget exactly.
    LargestRemainder,
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::Nearest => write!(f, "nearest"),
            RoundingMode::LargestRemainder => write!(f, "largest-remainder"),
        }
    }
}

impl std::str::FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" | "baseline" => Ok(RoundingMode::Nearest),
            "largest-remainder" | "rebalance" => Ok(RoundingMode::LargestRemainder),
            _ => Err(format!("Unknown rounding mode: {}", s)),
        }
    }
}

/// Final allocation output for one run
#[derive(Debug, Clone, Serialize)]
pub struct AllocationSolution {
    // === Result ===
    /// Integer posts per zone, the final allocation vector.
    pub allocation: Vec<u32>,
    /// Continuous optimum before integerization, one value per zone.
    pub continuous: Vec<f64>,
    /// Sum of the continuous optimum; compare against the budget to bound
    /// the integerization drift.
    pub continuous_sum: f64,

    // === Diagnostics ===
    /// Social cost at the continuous optimum.
    pub objective_value: f64,
    /// Iterations consumed by the constrained search.
    pub iterations: usize,
    /// Wall-clock solve time.
    pub solve_time_ms: u128,
    /// Identifier of the backend that produced the solution.
    pub backend: String,
    /// Integerization policy that produced `allocation`.
    pub rounding: RoundingMode,
}

impl AllocationSolution {
    /// Signed drift between the integer allocation and the rounded budget.
    pub fn rounding_drift(&self, budget: f64) -> i64 {
        self.allocation.iter().map(|&a| a as i64).sum::<i64>() - budget.round() as i64
    }
}
