//! # Allocation Problem Formulation
//!
//! This module defines the constrained nonlinear program behind charging-post
//! allocation. It transforms a validated [`Scenario`] into a structured
//! problem that solver backends can iterate against.
//!
//! ## Decision Variable Layout
//!
//! The decision vector `x` has one component per zone:
//!
//! ```text
//! x = [ x₀, x₁, ..., x_{n-1} ]      x_k = charging posts assigned to zone k
//! ```
//!
//! Components are real-valued during the search and only integerized after
//! the continuous optimum is found.
//!
//! ## Objective Function
//!
//! Social cost summed over all ordered zone pairs `(i, j), i ≠ j`:
//!
//! ```text
//! minimize  Σ_{i≠j} [ λ · distance[i,j] · congestion[i,j]  +  demand[j] / (μ · x[j]) ]
//!
//! where:
//!   λ  = lambda_coef, linear scaling of the travel-time term
//!   μ  = serving_rate, EVs served per post per unit time
//! ```
//!
//! The travel-time term runs over *ordered* pairs because both matrices may
//! be directional (i→j need not equal j→i). The queueing term is an
//! M/M/1-style average-wait proxy that depends only on the destination
//! zone's allocation: more posts in zone `j` reduce the wait contributed by
//! every other zone routing demand through it.
//!
//! ## Constraints
//!
//! ```text
//! Σ x[k] = budget            equality (spend the whole budget)
//! 1 ≤ x[k] ≤ budget          box bounds (every zone gets at least one post)
//! ```
//!
//! The lower bound of 1 keeps the queueing denominator away from zero at
//! every feasible point, which also makes the queueing term convex over the
//! feasible region. The problem is still treated as locally optimized only.

use evsa_core::{Scenario, SquareMatrix, ZoneId};

use super::AllocationError;
use crate::demand::charging_demand;

/// Floor applied to allocation components inside the queueing divide.
///
/// General-purpose solvers can probe infeasible points (zero or negative
/// allocations) during line search before bounds are enforced. Clamping the
/// denominator turns such probes into a large finite cost the solver can
/// backtrack from, instead of a division fault or an infinity that breaks
/// cost comparisons.
const DIVISION_FLOOR: f64 = 1e-6;

/// Constrained allocation problem, built once per run from a [`Scenario`].
///
/// Holds an immutable snapshot of the demand vector and the zone-pair
/// matrices, so objective evaluations are read-only and safe to run
/// concurrently (the gradient estimator relies on this).
#[derive(Debug, Clone)]
pub struct AllocationProblem {
    /// Number of zones (dimension of the decision vector).
    pub n_zones: usize,
    /// Total posts to place; right-hand side of the equality constraint.
    pub budget: f64,
    /// Expected charging demand per zone, derived once from EV counts.
    pub demand: Vec<f64>,
    /// Inter-zone distances (km).
    pub distances: SquareMatrix,
    /// Inter-zone congestion levels.
    pub congestion: SquareMatrix,
    /// EVs one post serves per unit time.
    pub serving_rate: f64,
    /// Travel-time scaling coefficient.
    pub lambda_coef: f64,
}

impl AllocationProblem {
    /// Build and validate the problem from a scenario.
    ///
    /// This is the eager-validation gate: every dimension and parameter
    /// error is detected here, before any solve attempt, so the solver only
    /// ever sees well-formed input.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, AllocationError> {
        let n = scenario.zones;

        if n < 1 {
            return Err(AllocationError::InvalidParameter(
                "zones must be at least 1".to_string(),
            ));
        }
        if !(scenario.serving_rate > 0.0) {
            return Err(AllocationError::InvalidParameter(format!(
                "serving_rate must be positive, got {}",
                scenario.serving_rate
            )));
        }
        // The equality constraint sum(x) == budget is provably infeasible
        // against the per-zone lower bound of 1 when budget < zones.
        if scenario.budget < n as f64 {
            return Err(AllocationError::InvalidParameter(format!(
                "budget ({}) must cover at least one post per zone ({} zones)",
                scenario.budget, n
            )));
        }

        check_matrix(&scenario.distances, "distances", n)?;
        check_matrix(&scenario.congestion, "congestion", n)?;
        if !scenario.distances.is_non_negative() {
            return Err(AllocationError::InvalidParameter(
                "distances must be non-negative".to_string(),
            ));
        }
        if let Some(names) = &scenario.zone_names {
            if names.len() != n {
                return Err(AllocationError::DimensionMismatch {
                    what: "zone_names".to_string(),
                    expected: n,
                    actual: names.len(),
                });
            }
        }

        let demand = charging_demand(n, &scenario.evs_per_zone, scenario.charge_station_proportion)?;

        Ok(Self {
            n_zones: n,
            budget: scenario.budget,
            demand,
            distances: scenario.distances.clone(),
            congestion: scenario.congestion.clone(),
            serving_rate: scenario.serving_rate,
            lambda_coef: scenario.lambda_coef,
        })
    }

    /// Evaluate the social-cost objective at allocation `x`.
    ///
    /// Sums travel time (`λ · d_ij · c_ij`) plus destination queueing delay
    /// (`demand_j / (μ · x_j)`) over all ordered zone pairs with `i ≠ j`.
    ///
    /// Zero or negative components are clamped to [`DIVISION_FLOOR`] inside
    /// the divide, yielding a large finite penalty rather than a fault, so
    /// the surrounding solver can always compare costs and backtrack.
    pub fn objective(&self, x: &[f64]) -> f64 {
        let mut total_cost = 0.0;

        for i in 0..self.n_zones {
            for j in 0..self.n_zones {
                if i == j {
                    continue;
                }
                let travel_time =
                    self.lambda_coef * self.distances.get(i, j) * self.congestion.get(i, j);
                let posts = x[j].max(DIVISION_FLOOR);
                let queueing_time = self.demand[j] / (self.serving_rate * posts);
                total_cost += travel_time + queueing_time;
            }
        }

        total_cost
    }

    /// Equality constraint residuals `g(x)`; feasible when all are zero.
    ///
    /// Single constraint: the allocation must spend the whole budget,
    /// `Σ x[k] - budget = 0`.
    pub fn equality_constraints(&self, x: &[f64]) -> Vec<f64> {
        vec![x.iter().sum::<f64>() - self.budget]
    }

    /// Box bounds for the decision vector: `1 ≤ x[k] ≤ budget`.
    pub fn variable_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        (vec![1.0; self.n_zones], vec![self.budget; self.n_zones])
    }

    /// Uniform initial guess `x0[k] = budget / zones`.
    ///
    /// Always feasible (budget >= zones is validated at construction), and
    /// fixed so repeated runs of the same scenario are reproducible.
    pub fn initial_point(&self) -> Vec<f64> {
        vec![self.budget / self.n_zones as f64; self.n_zones]
    }
}

fn check_matrix(
    matrix: &SquareMatrix,
    what: &str,
    n_zones: usize,
) -> Result<(), AllocationError> {
    if matrix.dim() != n_zones {
        return Err(AllocationError::DimensionMismatch {
            what: what.to_string(),
            expected: n_zones,
            actual: matrix.dim(),
        });
    }
    for i in 0..n_zones {
        if matrix.get(i, i) != 0.0 {
            return Err(AllocationError::InvalidParameter(format!(
                "{}: {} diagonal must be 0, got {}",
                ZoneId::new(i),
                what,
                matrix.get(i, i)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evsa_core::Scenario;

    fn scenario() -> Scenario {
        Scenario {
            zones: 2,
            budget: 10.0,
            evs_per_zone: vec![100, 100],
            distances: SquareMatrix::from_rows(vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap(),
            congestion: SquareMatrix::from_rows(vec![vec![0.0, 0.5], vec![0.5, 0.0]]).unwrap(),
            charge_station_proportion: 0.1,
            peak_hour_proportion: 0.1,
            serving_rate: 6.0,
            lambda_coef: 0.2,
            zone_names: None,
        }
    }

    #[test]
    fn test_from_scenario_derives_demand() {
        let problem = AllocationProblem::from_scenario(&scenario()).unwrap();
        assert_eq!(problem.n_zones, 2);
        assert_eq!(problem.demand, vec![10.0, 10.0]);
    }

    #[test]
    fn test_budget_below_zones_is_infeasible() {
        let mut s = scenario();
        s.budget = 1.0;
        let err = AllocationProblem::from_scenario(&s).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidParameter(_)));
    }

    #[test]
    fn test_nonpositive_serving_rate_rejected() {
        let mut s = scenario();
        s.serving_rate = 0.0;
        assert!(matches!(
            AllocationProblem::from_scenario(&s).unwrap_err(),
            AllocationError::InvalidParameter(_)
        ));

        s.serving_rate = f64::NAN;
        assert!(matches!(
            AllocationProblem::from_scenario(&s).unwrap_err(),
            AllocationError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_matrix_dimension_mismatch_rejected() {
        let mut s = scenario();
        s.distances = SquareMatrix::zeros(3);
        let err = AllocationProblem::from_scenario(&s).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::DimensionMismatch { expected: 2, actual: 3, .. }
        ));
    }

    #[test]
    fn test_nonzero_diagonal_rejected() {
        let mut s = scenario();
        s.congestion.set(1, 1, 0.3);
        let err = AllocationProblem::from_scenario(&s).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Zone 2"));
        assert!(msg.contains("congestion"));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let mut s = scenario();
        s.distances.set(0, 1, -1.0);
        assert!(matches!(
            AllocationProblem::from_scenario(&s).unwrap_err(),
            AllocationError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_zone_names_length_checked() {
        let mut s = scenario();
        s.zone_names = Some(vec!["North".into()]);
        assert!(matches!(
            AllocationProblem::from_scenario(&s).unwrap_err(),
            AllocationError::DimensionMismatch { .. }
        ));
    }

    #[test]
    fn test_objective_matches_hand_computation() {
        let problem = AllocationProblem::from_scenario(&scenario()).unwrap();
        // Two ordered pairs. Travel per pair: 0.2 * 5 * 0.5 = 0.5.
        // Queueing at x = [5, 5]: 10 / (6 * 5) = 1/3 per pair.
        let cost = problem.objective(&[5.0, 5.0]);
        let expected = 2.0 * (0.5 + 10.0 / 30.0);
        assert!((cost - expected).abs() < 1e-12);
    }

    #[test]
    fn test_objective_guards_zero_allocation() {
        let problem = AllocationProblem::from_scenario(&scenario()).unwrap();
        let cost = problem.objective(&[0.0, 5.0]);
        assert!(cost.is_finite());
        // 10 / (6 * 1e-6) dominates; the guard must make the cost huge.
        assert!(cost > 1e5);

        let cost_negative = problem.objective(&[-3.0, 5.0]);
        assert!(cost_negative.is_finite());
        assert!(cost_negative > 1e5);
    }

    #[test]
    fn test_equality_constraint_residual() {
        let problem = AllocationProblem::from_scenario(&scenario()).unwrap();
        assert_eq!(problem.equality_constraints(&[5.0, 5.0]), vec![0.0]);
        assert_eq!(problem.equality_constraints(&[6.0, 5.0]), vec![1.0]);
    }

    #[test]
    fn test_bounds_and_initial_point() {
        let problem = AllocationProblem::from_scenario(&scenario()).unwrap();
        let (lb, ub) = problem.variable_bounds();
        assert_eq!(lb, vec![1.0, 1.0]);
        assert_eq!(ub, vec![10.0, 10.0]);
        assert_eq!(problem.initial_point(), vec![5.0, 5.0]);
    }
}
