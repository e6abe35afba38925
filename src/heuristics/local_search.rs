//! Local search improvement heuristics for PDPTW.
//!
//! Each route is improved on its own by segment reversal (2-opt). A
//! reversal is kept only if the resulting route stays feasible, so the
//! time-window, capacity and precedence rules are never broken.

use crate::instance::PDPTWInstance;
use crate::solution::Solution;

/// Trait for local search improvement methods
pub trait LocalSearch {
    fn improve(&self, instance: &PDPTWInstance, solution: &mut Solution) -> bool;
    fn name(&self) -> &str;
}

/// Intra-route 2-Opt with feasibility checks
///
/// For a route of length `n`, the scan covers `i` in `0..n-3` and `j` in
/// `i+2..n-1`, reversing positions `i+1..=j`. The first strictly improving
/// feasible move is applied and the scan restarts; a route stops when a
/// full scan finds nothing. Routes shorter than four stops are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoOptSearch;

impl TwoOptSearch {
    pub const MIN_ROUTE_LEN: usize = 4;

    pub fn new() -> Self {
        TwoOptSearch
    }

    /// Improve one route in place, returning true if it changed
    pub fn improve_route(&self, instance: &PDPTWInstance, route: &mut Vec<usize>) -> bool {
        if route.len() < Self::MIN_ROUTE_LEN {
            return false;
        }

        let mut changed = false;
        let mut current_cost = instance.route_cost(route);

        while let Some((candidate, cost)) = self.first_improving_move(instance, route, current_cost) {
            *route = candidate;
            current_cost = cost;
            changed = true;
        }

        changed
    }

    fn first_improving_move(
        &self,
        instance: &PDPTWInstance,
        route: &[usize],
        current_cost: i64,
    ) -> Option<(Vec<usize>, i64)> {
        let n = route.len();

        for i in 0..n - 3 {
            for j in i + 2..n - 1 {
                let mut candidate = route.to_vec();
                candidate[i + 1..=j].reverse();

                if !instance.is_feasible(&candidate) {
                    continue;
                }
                let cost = instance.route_cost(&candidate);
                if cost < current_cost {
                    return Some((candidate, cost));
                }
            }
        }

        None
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve(&self, instance: &PDPTWInstance, solution: &mut Solution) -> bool {
        let mut improved = false;
        for route in solution.routes.iter_mut() {
            improved |= self.improve_route(instance, route);
        }

        if improved {
            solution.evaluate(instance);
        }
        improved
    }

    fn name(&self) -> &str {
        "2-Opt"
    }
}
