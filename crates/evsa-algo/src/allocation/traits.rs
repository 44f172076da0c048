//! Core traits for the pluggable allocation-solver architecture.
//!
//! The constrained search is delegated through a Strategy trait so the
//! iteration-limit and failure behavior of the solve is explicit and
//! testable, rather than buried inside one hard-wired library call. New
//! backends can be added without modifying existing code.

use super::problem::AllocationProblem;
use super::AllocationError;

/// Configuration passed to solver backends.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum iterations across the whole search
    pub max_iterations: usize,
    /// Convergence tolerance on constraint violation
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-6,
        }
    }
}

/// Continuous minimizer found by a backend, before integerization.
#[derive(Debug, Clone)]
pub struct ContinuousSolution {
    /// The continuous allocation vector, projected onto bounds.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub objective_value: f64,
    /// Iterations consumed by the search.
    pub iterations: usize,
}

/// Implements the constrained continuous search (how to solve).
///
/// A backend receives the problem (objective + equality constraints +
/// bounds + initial point) and either converges to a feasible local
/// minimizer or surfaces [`AllocationError::NonConvergence`] carrying its
/// best iterate. Backends must never let numeric hazards from infeasible
/// probes escape as faults.
pub trait NlpBackend: Send + Sync {
    /// Unique identifier (e.g., "penalty-lbfgs")
    fn id(&self) -> &str;

    /// Check if this backend is available at runtime
    fn is_available(&self) -> bool;

    /// Run the constrained search
    fn solve(
        &self,
        problem: &AllocationProblem,
        config: &SolverConfig,
    ) -> Result<ContinuousSolution, AllocationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the trait is object-safe (can be used with dyn).
    #[test]
    fn test_backend_trait_is_object_safe() {
        // This test passes if it compiles - the trait must be object-safe
        fn _accepts_backend(_b: &dyn NlpBackend) {}
    }

    /// Test that trait objects can be Send + Sync (required for Arc).
    #[test]
    fn test_backend_trait_is_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}

        _assert_send::<Box<dyn NlpBackend>>();
        _assert_sync::<Box<dyn NlpBackend>>();
    }

    /// Test default SolverConfig values.
    #[test]
    fn test_solver_config_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.tolerance, 1e-6);
    }
}
