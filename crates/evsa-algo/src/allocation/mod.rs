//! Charging-post allocation optimizer
//!
//! This module wires the three pipeline stages together:
//! - demand derivation and eager input validation ([`AllocationProblem`])
//! - the constrained continuous search (penalty method + L-BFGS by default,
//!   pluggable through [`NlpBackend`])
//! - integer projection of the continuous optimum ([`RoundingMode`])

mod problem;
mod rounding;
mod solver;
mod traits;
mod types;

pub use problem::AllocationProblem;
pub use rounding::round_allocation;
pub use solver::PenaltyLbfgs;
pub use traits::{ContinuousSolution, NlpBackend, SolverConfig};
pub use types::{AllocationSolution, RoundingMode};

use std::sync::Arc;
use std::time::Instant;

use evsa_core::{EvsaError, Scenario};
use thiserror::Error;

/// Allocation solver errors
#[derive(Debug, Clone, Error)]
pub enum AllocationError {
    /// An input vector or matrix does not match the zone count
    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// A scalar parameter is out of range or makes the problem infeasible
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The constrained search exhausted its budget without reaching
    /// feasibility; carries the best iterate for diagnostics and retry
    #[error(
        "allocation search failed to converge after {iterations} iterations \
         (violation: {violation:.2e})"
    )]
    NonConvergence {
        iterations: usize,
        violation: f64,
        best_cost: f64,
        best_point: Vec<f64>,
    },
}

impl From<AllocationError> for EvsaError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::NonConvergence { .. } => EvsaError::Solver(err.to_string()),
            _ => EvsaError::Validation(err.to_string()),
        }
    }
}

/// Unified allocation solver with builder-style configuration
///
/// ```
/// use evsa_algo::{AllocationSolver, RoundingMode};
/// use evsa_core::Scenario;
///
/// let scenario = Scenario::from_json(r#"{
///     "zones": 2,
///     "budget": 10.0,
///     "evs_per_zone": [100, 100],
///     "distances": [[0.0, 5.0], [5.0, 0.0]],
///     "congestion": [[0.0, 0.5], [0.5, 0.0]],
///     "charge_station_proportion": 0.1,
///     "peak_hour_proportion": 0.1,
///     "serving_rate": 6.0,
///     "lambda_coef": 0.2
/// }"#).unwrap();
///
/// let solution = AllocationSolver::new()
///     .with_rounding(RoundingMode::Nearest)
///     .solve(&scenario)
///     .unwrap();
///
/// assert_eq!(solution.allocation, vec![5, 5]);
/// ```
pub struct AllocationSolver {
    config: SolverConfig,
    rounding: RoundingMode,
    backend: Arc<dyn NlpBackend>,
}

impl AllocationSolver {
    /// Create a solver with default settings (penalty-lbfgs backend,
    /// nearest rounding).
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
            rounding: RoundingMode::default(),
            backend: Arc::new(PenaltyLbfgs),
        }
    }

    /// Set the total iteration budget for the constrained search.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.config.max_iterations = max_iter;
        self
    }

    /// Set the convergence tolerance on constraint violation.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.config.tolerance = tol;
        self
    }

    /// Set the integerization policy.
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    /// Swap in a custom continuous-search backend.
    pub fn with_backend(mut self, backend: Arc<dyn NlpBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Get the configured rounding mode.
    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Run the full pipeline: validate, derive demand, search, integerize.
    ///
    /// Dimension and parameter errors surface before any search work; the
    /// only error a well-formed scenario can produce is
    /// [`AllocationError::NonConvergence`].
    pub fn solve(&self, scenario: &Scenario) -> Result<AllocationSolution, AllocationError> {
        let start = Instant::now();

        let problem = AllocationProblem::from_scenario(scenario)?;

        let continuous = if problem.n_zones == 1 {
            // Single zone: the equality constraint pins the unique feasible
            // point, no search needed.
            let x = vec![problem.budget];
            let objective_value = problem.objective(&x);
            ContinuousSolution {
                x,
                objective_value,
                iterations: 0,
            }
        } else {
            self.backend.solve(&problem, &self.config)?
        };

        let allocation = round_allocation(&continuous.x, problem.budget, self.rounding);
        let continuous_sum = continuous.x.iter().sum();

        Ok(AllocationSolution {
            allocation,
            continuous: continuous.x,
            continuous_sum,
            objective_value: continuous.objective_value,
            iterations: continuous.iterations,
            solve_time_ms: start.elapsed().as_millis(),
            backend: self.backend.id().to_string(),
            rounding: self.rounding,
        })
    }
}

impl Default for AllocationSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve a scenario with default settings.
///
/// Convenience wrapper over [`AllocationSolver`] for callers that do not
/// need to tune the search.
pub fn optimize(scenario: &Scenario) -> Result<AllocationSolution, AllocationError> {
    AllocationSolver::new().solve(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evsa_core::SquareMatrix;

    fn scenario(evs: Vec<u64>, budget: f64) -> Scenario {
        let n = evs.len();
        let mut distances = SquareMatrix::zeros(n);
        let mut congestion = SquareMatrix::zeros(n);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    distances.set(i, j, 5.0);
                    congestion.set(i, j, 0.5);
                }
            }
        }
        Scenario {
            zones: n,
            budget,
            evs_per_zone: evs,
            distances,
            congestion,
            charge_station_proportion: 0.1,
            peak_hour_proportion: 0.1,
            serving_rate: 6.0,
            lambda_coef: 0.2,
            zone_names: None,
        }
    }

    #[test]
    fn test_allocation_has_zone_length() {
        let solution = optimize(&scenario(vec![100, 50, 25], 12.0)).unwrap();
        assert_eq!(solution.allocation.len(), 3);
        assert_eq!(solution.continuous.len(), 3);
    }

    #[test]
    fn test_single_zone_takes_whole_budget() {
        let solution = optimize(&scenario(vec![100], 7.0)).unwrap();
        assert_eq!(solution.allocation, vec![7]);
        assert_eq!(solution.iterations, 0);

        // Fractional budgets round to the nearest integer.
        let solution = optimize(&scenario(vec![100], 7.4)).unwrap();
        assert_eq!(solution.allocation, vec![7]);
    }

    #[test]
    fn test_symmetric_scenario_allocates_equally() {
        // zones=2, budget=10, evs=[100,100], d=5, c=0.5, csp=0.1, rate=6,
        // lambda=0.2: symmetric demand must split the budget evenly.
        let solution = optimize(&scenario(vec![100, 100], 10.0)).unwrap();
        assert_eq!(solution.allocation, vec![5, 5]);
    }

    #[test]
    fn test_asymmetric_demand_gets_larger_share() {
        let solution = optimize(&scenario(vec![200, 50], 10.0)).unwrap();
        assert!(
            solution.allocation[0] > solution.allocation[1],
            "high-demand zone should receive strictly more posts: {:?}",
            solution.allocation
        );
    }

    #[test]
    fn test_zero_matrices_yield_uniform_continuous_optimum() {
        // Pure queueing balance: with no travel term the unique stationary
        // point under the budget constraint is the uniform allocation.
        let n = 4;
        let mut s = scenario(vec![100; n], 20.0);
        s.distances = SquareMatrix::zeros(n);
        s.congestion = SquareMatrix::zeros(n);

        let solution = optimize(&s).unwrap();
        for x in &solution.continuous {
            assert!((x - 5.0).abs() < 1e-2, "expected uniform 5.0, got {x}");
        }
    }

    #[test]
    fn test_serving_rate_monotonicity() {
        let base = optimize(&scenario(vec![120, 80], 10.0)).unwrap();

        let mut faster = scenario(vec![120, 80], 10.0);
        faster.serving_rate = 12.0;
        let improved = optimize(&faster).unwrap();

        assert!(improved.objective_value <= base.objective_value + 1e-9);
    }

    #[test]
    fn test_budget_below_zones_fails_before_solving() {
        let err = optimize(&scenario(vec![100, 100, 100], 2.0)).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidParameter(_)));
    }

    #[test]
    fn test_rounding_drift_is_bounded() {
        let s = scenario(vec![170, 45, 95], 13.0);
        let solution = optimize(&s).unwrap();

        let drift = solution.rounding_drift(s.budget).unsigned_abs() as f64;
        assert!(drift <= s.zones as f64 / 2.0);
        // The continuous sum satisfies the budget constraint to solver
        // tolerance; drift is introduced by integerization alone.
        assert!((solution.continuous_sum - s.budget).abs() < 1e-4);
    }

    #[test]
    fn test_largest_remainder_mode_matches_budget_exactly() {
        let s = scenario(vec![170, 45, 95], 13.0);
        let solution = AllocationSolver::new()
            .with_rounding(RoundingMode::LargestRemainder)
            .solve(&s)
            .unwrap();

        assert_eq!(solution.allocation.iter().sum::<u32>(), 13);
    }

    #[test]
    fn test_solution_reports_backend() {
        let solution = optimize(&scenario(vec![100, 100], 10.0)).unwrap();
        assert_eq!(solution.backend, "penalty-lbfgs");
        assert!(solution.iterations > 0);
    }

    #[test]
    fn test_error_converts_to_unified_type() {
        let err = optimize(&scenario(vec![100, 100], 1.0)).unwrap_err();
        let unified: EvsaError = err.into();
        assert!(matches!(unified, EvsaError::Validation(_)));
    }
}
