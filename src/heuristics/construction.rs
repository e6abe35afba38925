use crate::heuristics::insertion::{ExhaustiveInsertion, InsertionSearch};
use crate::instance::PDPTWInstance;
use crate::solution::{Insertion, Solution};
use std::collections::BTreeSet;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &PDPTWInstance) -> Solution;
    fn name(&self) -> &str;
}

/// The unplaced pair whose cheapest feasible insertion costs least.
///
/// Candidates are scanned in ascending pickup id and ties keep the first.
/// Pairs with no feasible insertion are never chosen.
pub fn cheapest_insertion<S: InsertionSearch + ?Sized>(
    instance: &PDPTWInstance,
    search: &S,
    routes: &[Vec<usize>],
    candidates: &BTreeSet<usize>,
) -> Option<Insertion> {
    let mut best: Option<Insertion> = None;

    for &pickup in candidates {
        if let Some(candidate) = search.best_insertion(instance, routes, pickup) {
            if best.map_or(true, |b| candidate.cost_increase < b.cost_increase) {
                best = Some(candidate);
            }
        }
    }

    best
}

/// Global cheapest-insertion over a fixed number of route slots.
///
/// After every committed insertion all unplaced pairs are re-evaluated
/// against all routes. Pairs that fit nowhere are left unserved.
pub fn greedy_routes<S: InsertionSearch + ?Sized>(
    instance: &PDPTWInstance,
    search: &S,
    num_routes: usize,
) -> Vec<Vec<usize>> {
    let mut routes = vec![Vec::new(); num_routes];
    let mut unplaced: BTreeSet<usize> = instance.pickup_nodes().iter().copied().collect();

    while let Some(insertion) = cheapest_insertion(instance, search, &routes, &unplaced) {
        insertion.apply(&mut routes);
        unplaced.remove(&insertion.pickup);
    }

    routes
}

/// Greedy Insertion Heuristic
///
/// Repeatedly inserts the pair that causes the minimum increase in route
/// travel time, across all route slots.
pub struct GreedyInsertionHeuristic<S: InsertionSearch = ExhaustiveInsertion> {
    pub num_routes: usize,
    pub search: S,
}

impl GreedyInsertionHeuristic {
    pub fn new(num_routes: usize) -> Self {
        GreedyInsertionHeuristic {
            num_routes,
            search: ExhaustiveInsertion,
        }
    }
}

impl<S: InsertionSearch> GreedyInsertionHeuristic<S> {
    pub fn with_search(num_routes: usize, search: S) -> Self {
        GreedyInsertionHeuristic { num_routes, search }
    }
}

impl<S: InsertionSearch> ConstructionHeuristic for GreedyInsertionHeuristic<S> {
    fn construct(&self, instance: &PDPTWInstance) -> Solution {
        let start = std::time::Instant::now();

        let routes = greedy_routes(instance, &self.search, self.num_routes);

        let mut solution = Solution::from_routes(instance, routes, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "GreedyInsertion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_greedy_single_pair() {
        let instance = single_pair_instance();
        let solution = GreedyInsertionHeuristic::new(3).construct(&instance);

        assert_eq!(solution.routes, vec![vec![1, 2], vec![], vec![]]);
        assert_eq!(solution.used_routes, 1);
        assert_eq!(solution.total_cost, 3 + 4 + 5);
    }

    #[test]
    fn test_greedy_leaves_unreachable_pair() {
        let instance = unreachable_delivery_instance();
        let solution = GreedyInsertionHeuristic::new(2).construct(&instance);

        assert_eq!(solution.served_pairs(), 0);
        assert_eq!(solution.used_routes, 0);
    }

    #[test]
    fn test_greedy_respects_route_limit() {
        let instance = disjoint_pairs_instance();

        let one = GreedyInsertionHeuristic::new(1).construct(&instance);
        assert_eq!(one.served_pairs(), 1);
        assert_eq!(one.routes[0], vec![1, 2]);

        let two = GreedyInsertionHeuristic::new(2).construct(&instance);
        assert_eq!(two.served_pairs(), 2);
        assert_eq!(two.routes, vec![vec![1, 2], vec![3, 4]]);
        assert!(two.is_feasible(&instance));
    }

    #[test]
    fn test_greedy_with_custom_search() {
        let instance = disjoint_pairs_instance();
        let greedy = GreedyInsertionHeuristic::with_search(2, FirstRouteOnly);
        let solution = greedy.construct(&instance);

        assert_eq!(solution.routes, vec![vec![1, 2], vec![]]);
        assert_eq!(solution.served_pairs(), 1);
    }

    #[test]
    fn test_greedy_capacity_split() {
        let instance = two_pair_instance();
        let solution = GreedyInsertionHeuristic::new(2).construct(&instance);

        assert_eq!(solution.served_pairs(), 2);
        assert!(solution.is_feasible(&instance));
        // Chaining both pairs in one route (cost 50) beats two routes (60)
        assert_eq!(solution.used_routes, 1);
        assert_eq!(solution.total_cost, 50);
    }
}
