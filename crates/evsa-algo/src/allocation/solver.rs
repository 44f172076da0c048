//! # Constrained Allocation Solver: Penalty Method with L-BFGS
//!
//! This module implements the **exterior penalty method** for the allocation
//! nonlinear program. The constrained problem
//!
//! ```text
//! minimize    f(x)                 (social cost)
//! subject to  Σ x[k] = budget      (spend the whole budget)
//!             1 ≤ x[k] ≤ budget    (box bounds)
//! ```
//!
//! is converted into a sequence of unconstrained problems
//!
//! ```text
//! minimize  P_μ(x) = f(x) + μ · g(x)² + μ · Σ max(0, 1 - x_k)² + μ · Σ max(0, x_k - budget)²
//! ```
//!
//! where `g(x) = Σ x[k] - budget` and the penalty parameter μ increases
//! across outer iterations (μ₀ = 1000, ×10 per round). Each subproblem is
//! solved with L-BFGS and a More-Thuente line search; gradients come from
//! forward finite differences, with the independent probe evaluations run
//! in parallel. That is sound because the objective is pure and reads only
//! an immutable snapshot of the demand vector and zone-pair matrices.
//!
//! The method is robust to the infeasible probes a line search generates
//! (the objective's division guard keeps them finite), works from any
//! starting point, and converges to the constrained optimum as μ grows,
//! with constraint violation shrinking as `O(1/√μ)`. It is a **local**
//! search: the uniform initial point makes repeated runs reproducible, but
//! no global-optimality claim is made.
//!
//! ## References
//!
//! - **Nocedal & Wright (2006)**: "Numerical Optimization", 2nd Ed.
//!   Springer. Chapter 17 covers quadratic penalty methods.
//! - **Liu & Nocedal (1989)**: "On the Limited Memory BFGS Method for
//!   Large Scale Optimization", Mathematical Programming, 45(1), 503-528.
//! - **Moré & Thuente (1994)**: "Line Search Algorithms with Guaranteed
//!   Sufficient Decrease", ACM TOMS, 20(3), 286-307.

use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use rayon::prelude::*;

use super::problem::AllocationProblem;
use super::traits::{ContinuousSolution, NlpBackend, SolverConfig};
use super::AllocationError;

// ============================================================================
// PENALTY FUNCTION WRAPPER
// ============================================================================

/// Wrapper that converts the constrained allocation problem into an
/// unconstrained one by adding quadratic penalty terms for constraint
/// violations.
struct PenaltyProblem<'a> {
    /// The underlying allocation problem (objective, constraints)
    problem: &'a AllocationProblem,

    /// Current penalty parameter μ.
    /// Larger values enforce constraints more strictly but worsen conditioning.
    penalty: f64,

    /// Lower bounds on allocation components
    lb: Vec<f64>,

    /// Upper bounds on allocation components
    ub: Vec<f64>,
}

impl<'a> CostFunction for PenaltyProblem<'a> {
    type Param = Vec<f64>;
    type Output = f64;

    /// Evaluate the penalized objective:
    ///
    /// ```text
    /// P_μ(x) = f(x)                           (social cost)
    ///        + μ · Σ g_i(x)²                  (budget equality penalty)
    ///        + μ · Σ max(0, lb_i - x_i)²      (lower bound penalty)
    ///        + μ · Σ max(0, x_i - ub_i)²      (upper bound penalty)
    /// ```
    ///
    /// The quadratic forms keep the gradient smooth (unlike |g|), and the
    /// exterior formulation grows the cost as iterates leave the feasible
    /// box, steering the line search back inside.
    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let mut cost = self.problem.objective(x);

        let g = self.problem.equality_constraints(x);
        for gi in &g {
            cost += self.penalty * gi * gi;
        }

        for i in 0..x.len() {
            if x[i] < self.lb[i] {
                let violation = self.lb[i] - x[i];
                cost += self.penalty * violation * violation;
            }
            if x[i] > self.ub[i] {
                let violation = x[i] - self.ub[i];
                cost += self.penalty * violation * violation;
            }
        }

        Ok(cost)
    }
}

impl<'a> Gradient for PenaltyProblem<'a> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    /// Gradient of the penalized objective by forward finite differences:
    ///
    /// ```text
    /// ∂P_μ/∂x_i ≈ [P_μ(x + ε·e_i) - P_μ(x)] / ε         ε = 10⁻⁷
    /// ```
    ///
    /// The n probe evaluations are independent and the cost function is
    /// read-only over shared data, so they run in parallel.
    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        let n = x.len();

        // ε ≈ √(machine epsilon): small enough to approximate the
        // derivative, large enough to stay above numerical noise.
        let eps = 1e-7;

        let f0 = self.cost(x)?;

        (0..n)
            .into_par_iter()
            .map(|i| {
                let mut x_plus = x.clone();
                x_plus[i] += eps;
                let f_plus = self.cost(&x_plus)?;
                Ok((f_plus - f0) / eps)
            })
            .collect::<Result<Vec<f64>, argmin::core::Error>>()
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Maximum violation of the box constraints.
///
/// Returns `max_i max(lb_i - x_i, x_i - ub_i, 0)`; zero means all bounds hold.
fn max_bound_violation(x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
    let mut max_viol: f64 = 0.0;
    for i in 0..x.len() {
        if x[i] < lb[i] {
            max_viol = max_viol.max(lb[i] - x[i]);
        }
        if x[i] > ub[i] {
            max_viol = max_viol.max(x[i] - ub[i]);
        }
    }
    max_viol
}

/// Project a point onto the box `[lb, ub]`, component-wise.
///
/// Ensures the returned solution strictly satisfies bounds even when the
/// finite penalty left small violations.
fn project_onto_bounds(x: &mut [f64], lb: &[f64], ub: &[f64]) {
    for i in 0..x.len() {
        x[i] = x[i].max(lb[i]).min(ub[i]);
    }
}

// ============================================================================
// MAIN SOLVER
// ============================================================================

/// Solve the allocation NLP with the penalty method.
///
/// 1. Start from the uniform initial point `budget / zones`
/// 2. Solve the unconstrained subproblem for the current μ with L-BFGS
/// 3. Check equality and bound violations against the tolerance
/// 4. If violated, increase μ (up to 5 outer rounds) and repeat
/// 5. Project the final iterate onto bounds
///
/// Non-convergence (violation still above 10× tolerance after the final
/// round) is surfaced as [`AllocationError::NonConvergence`] carrying the
/// best iterate, its cost, and the iteration count, so the caller can decide
/// whether to retry with a different tolerance or iteration budget.
pub fn solve(
    problem: &AllocationProblem,
    config: &SolverConfig,
) -> Result<ContinuousSolution, AllocationError> {
    let (lb, ub) = problem.variable_bounds();

    // μ₀ = 1000 starts moderate: low enough to avoid ill-conditioning from
    // the first round, high enough that feasibility improves quickly. The
    // ×10 ramp over at most 5 rounds tops out at μ = 10⁷.
    let mut x = problem.initial_point();
    let mut penalty = 1000.0;
    let penalty_increase = 10.0;
    let max_penalty_iters = 5;
    let mut total_iterations = 0;

    for _outer_iter in 0..max_penalty_iters {
        let penalty_problem = PenaltyProblem {
            problem,
            penalty,
            lb: lb.clone(),
            ub: ub.clone(),
        };

        // More-Thuente satisfies the strong Wolfe conditions; memory m=7 is
        // the standard L-BFGS history length.
        let linesearch = MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, 7);

        // Split the iteration budget evenly across the outer rounds.
        let inner_max_iter = (config.max_iterations as u64 / max_penalty_iters as u64).max(1);

        let executor = Executor::new(penalty_problem, solver).configure(|state| {
            state
                .param(x.clone())
                .max_iters(inner_max_iter)
                .target_cost(0.0)
        });

        match executor.run() {
            Ok(res) => {
                total_iterations += res.state().get_iter() as usize;
                if let Some(best) = res.state().get_best_param() {
                    x = best.clone();
                }
            }
            Err(_) => {
                // L-BFGS failed (e.g., line search breakdown).
                // Keep the current x; a larger penalty may recover.
            }
        }

        let eq_violation: f64 = problem
            .equality_constraints(&x)
            .iter()
            .map(|gi| gi.abs())
            .fold(0.0, f64::max);
        let bound_violation = max_bound_violation(&x, &lb, &ub);

        if eq_violation.max(bound_violation) < config.tolerance {
            break;
        }

        penalty *= penalty_increase;
    }

    // Strict bound feasibility, then re-measure what projection left behind.
    project_onto_bounds(&mut x, &lb, &ub);

    let eq_violation: f64 = problem
        .equality_constraints(&x)
        .iter()
        .map(|gi| gi.abs())
        .fold(0.0, f64::max);
    let bound_violation = max_bound_violation(&x, &lb, &ub);
    let max_violation = eq_violation.max(bound_violation);

    // The finite penalty never reaches exact feasibility and projection can
    // nudge the equality residual, so accept up to 10× the tolerance.
    if max_violation >= config.tolerance * 10.0 {
        let best_cost = problem.objective(&x);
        return Err(AllocationError::NonConvergence {
            iterations: total_iterations,
            violation: max_violation,
            best_cost,
            best_point: x,
        });
    }

    let objective_value = problem.objective(&x);
    Ok(ContinuousSolution {
        x,
        objective_value,
        iterations: total_iterations,
    })
}

// ============================================================================
// BACKEND REGISTRATION
// ============================================================================

/// Penalty-method L-BFGS backend.
///
/// Always available as a pure-Rust default; no native libraries required.
pub struct PenaltyLbfgs;

impl NlpBackend for PenaltyLbfgs {
    fn id(&self) -> &str {
        "penalty-lbfgs"
    }

    fn is_available(&self) -> bool {
        true // Always available (pure Rust)
    }

    fn solve(
        &self,
        problem: &AllocationProblem,
        config: &SolverConfig,
    ) -> Result<ContinuousSolution, AllocationError> {
        solve(problem, config)
    }
}

// ============================================================================
// TESTS
// ============================================================================
