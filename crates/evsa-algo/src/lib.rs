//! # evsa-algo: Charging-Station Allocation Algorithms
//!
//! This crate implements the constrained nonlinear optimizer that distributes
//! a fixed budget of charging posts across geographic zones, minimizing a
//! social-cost objective that combines inter-zone travel time with queueing
//! delay at destination charging points.
//!
//! ## Pipeline
//!
//! Three stages execute in sequence for every run:
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Demand Deriver | [`demand`] | EV counts × station proportion → per-zone demand |
//! | Cost Evaluator | [`AllocationProblem`] | social cost over all ordered zone pairs |
//! | Constrained Solver | [`allocation`] | bounded, budget-constrained local search + integerization |
//!
//! ## Architecture
//!
//! The continuous search sits behind the [`NlpBackend`] Strategy trait
//! ("objective + constraints + bounds → solution"), so iteration-limit and
//! failure behavior is explicit and testable:
//!
//! - **[`AllocationProblem`]**: the mathematical problem (what to solve)
//! - **[`NlpBackend`]**: the search algorithm (how to solve it)
//! - **[`PenaltyLbfgs`]**: default pure-Rust backend (exterior penalty + L-BFGS)
//! - **[`RoundingMode`]**: integerization policy for the continuous optimum
//!
//! ## Example
//!
//! ```ignore
//! use evsa_algo::optimize;
//! use evsa_core::Scenario;
//!
//! let scenario = Scenario::from_json(&std::fs::read_to_string("scenario.json")?)?;
//! let solution = optimize(&scenario)?;
//! println!("posts per zone: {:?}", solution.allocation);
//! ```

pub mod allocation;
pub mod demand;

pub use allocation::{
    optimize, round_allocation, AllocationError, AllocationProblem, AllocationSolution,
    AllocationSolver, ContinuousSolution, NlpBackend, PenaltyLbfgs, RoundingMode, SolverConfig,
};
pub use demand::charging_demand;
