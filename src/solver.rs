//! Route-count escalation around the hybrid colony.
//!
//! A colony run works with a fixed number of route slots. When its best
//! solution leaves pairs unserved, the solver retries with one more slot,
//! up to twice the number of pairs.

use crate::heuristics::aco::{HybridAntColony, Termination};
use crate::heuristics::insertion::{ExhaustiveInsertion, InsertionSearch};
use crate::instance::{PDPTWInstance, RunParameters};
use crate::solution::Solution;
use serde::Serialize;

/// Whether every pickup/delivery pair is served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Coverage {
    Complete,
    Incomplete { served: usize, required: usize },
}

impl Coverage {
    pub fn of(solution: &Solution, required: usize) -> Self {
        let served = solution.served_pairs();
        if served == required {
            Coverage::Complete
        } else {
            Coverage::Incomplete { served, required }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Coverage::Complete)
    }
}

/// Result of a full solve
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub solution: Solution,
    pub coverage: Coverage,
    /// Route count of the last attempt
    pub routes_attempted: usize,
    /// Number of colony runs performed
    pub attempts: usize,
}

/// Hybrid ACO solver with route-count escalation
pub struct HybridSolver<'a, S: InsertionSearch = ExhaustiveInsertion> {
    instance: &'a PDPTWInstance,
    colony: HybridAntColony<'a, S>,
}

impl<'a> HybridSolver<'a> {
    pub fn new(instance: &'a PDPTWInstance, params: &RunParameters) -> Self {
        HybridSolver {
            instance,
            colony: HybridAntColony::new(instance, params.config),
        }
    }
}

impl<'a, S: InsertionSearch> HybridSolver<'a, S> {
    pub fn with_colony(instance: &'a PDPTWInstance, colony: HybridAntColony<'a, S>) -> Self {
        HybridSolver { instance, colony }
    }

    /// Solve starting from `num_routes` slots (at least one).
    pub fn solve(&mut self, num_routes: usize) -> SolveOutcome {
        let start = std::time::Instant::now();
        let required = self.instance.required_pairs();
        let first = num_routes.max(1);

        if required == 0 {
            let mut solution = Solution::new(first);
            solution.algorithm = "HybridACO".to_string();
            return SolveOutcome {
                solution,
                coverage: Coverage::Complete,
                routes_attempted: first,
                attempts: 0,
            };
        }

        let max_routes = (2 * required).max(first);
        let mut routes = first;
        let mut attempts = 0;

        loop {
            log::info!("Attempting solution with {} routes...", routes);
            let outcome = self.colony.run(routes);
            attempts += 1;

            if outcome.termination == Termination::Converged {
                log::debug!("Colony converged after {} iterations", outcome.iterations);
            }

            let mut solution = outcome.solution;
            let coverage = Coverage::of(&solution, required);

            match coverage {
                Coverage::Complete => {
                    log::info!(
                        "All pairs served using {} routes, total cost {}",
                        solution.used_routes,
                        solution.total_cost
                    );
                }
                Coverage::Incomplete { served, required } if routes < max_routes => {
                    log::info!(
                        "Served {} out of {} pairs. Increasing number of routes...",
                        served,
                        required
                    );
                    routes += 1;
                    continue;
                }
                Coverage::Incomplete { served, required } => {
                    log::warn!(
                        "Could not serve all pairs even with {} routes ({} of {} served)",
                        routes,
                        served,
                        required
                    );
                }
            }

            solution.computation_time = start.elapsed().as_secs_f64();
            return SolveOutcome {
                solution,
                coverage,
                routes_attempted: routes,
                attempts,
            };
        }
    }
}

/// Solve an instance with the given run parameters
pub fn solve(instance: &PDPTWInstance, params: &RunParameters) -> SolveOutcome {
    HybridSolver::new(instance, params).solve(params.num_routes)
}
