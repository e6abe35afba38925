//! PDPTW Solver Library
//!
//! A hybrid Ant Colony Optimization + greedy insertion solver for the
//! Pickup and Delivery Problem with Time Windows (PDPTW).
//!
//! # Features
//!
//! - Instance and parameter-line parsing with lenient numeric defaults
//! - Route feasibility (precedence, capacity, time windows) and cost
//! - Greedy cheapest-insertion construction
//! - Hybrid ants mixing greedy steps with pheromone-guided pair selection
//! - Intra-route 2-opt improvement
//! - Route-count escalation until every pair is served
//! - Seeded benchmarking with CSV export
//!
//! # Example
//!
//! ```no_run
//! use pdptw_solver::instance::{PDPTWInstance, RunParameters};
//! use pdptw_solver::solver::HybridSolver;
//!
//! let instance = PDPTWInstance::from_file("input.txt").unwrap();
//! let params = RunParameters::from_file("input.txt").unwrap();
//!
//! let outcome = HybridSolver::new(&instance, &params).solve(params.num_routes);
//!
//! println!("Routes: {}, cost: {}", outcome.solution.used_routes, outcome.solution.total_cost);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod solver;
pub mod benchmark;

#[cfg(test)]
mod test_utils;

pub use error::InstanceError;
pub use instance::{PDPTWInstance, RunParameters};
pub use solution::Solution;
pub use solver::{Coverage, HybridSolver, SolveOutcome};
