//! Pheromone trail matrix shared by the ants of a colony.

use crate::heuristics::construction::greedy_routes;
use crate::heuristics::insertion::InsertionSearch;
use crate::instance::PDPTWInstance;
use crate::solution::Solution;

/// Trail level on every arc before seeding
pub const INITIAL_PHEROMONE: f64 = 1.0;
/// Extra trail laid on each arc of the greedy seed routes
pub const SEED_DEPOSIT: f64 = 2.0;
/// Elite deposit is `DEPOSIT_FACTOR / (total_cost + 1)`
pub const DEPOSIT_FACTOR: f64 = 10.0;
/// Route slots used to build the seed routes
pub const SEED_ROUTES: usize = 3;

/// Square matrix of trail levels indexed by node id
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    values: Vec<Vec<f64>>,
}

impl PheromoneMatrix {
    /// Uniform matrix at [`INITIAL_PHEROMONE`]
    pub fn new(size: usize) -> Self {
        PheromoneMatrix {
            values: vec![vec![INITIAL_PHEROMONE; size]; size],
        }
    }

    /// Uniform matrix reinforced along the given seed routes
    pub fn initialize(size: usize, seed_routes: &[Vec<usize>]) -> Self {
        let mut matrix = Self::new(size);
        for route in seed_routes {
            matrix.deposit_route(route, SEED_DEPOSIT);
        }
        matrix
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from][to]
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.values[from]
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Multiply every entry by `1 - rho`, floored at zero
    pub fn evaporate(&mut self, rho: f64) {
        let factor = (1.0 - rho).max(0.0);
        for row in &mut self.values {
            for value in row.iter_mut() {
                *value *= factor;
            }
        }
    }

    /// Add `amount` on every arc of a depot-to-depot route
    pub fn deposit_route(&mut self, route: &[usize], amount: f64) {
        let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
            return;
        };

        self.values[0][first] += amount;
        for arc in route.windows(2) {
            self.values[arc[0]][arc[1]] += amount;
        }
        self.values[last][0] += amount;
    }

    /// Reinforce the routes of the first `elite` solutions of a sorted batch
    pub fn reinforce(&mut self, ranked: &[Solution], elite: usize) {
        for solution in ranked.iter().take(elite) {
            let amount = DEPOSIT_FACTOR / (solution.total_cost as f64 + 1.0);
            for route in solution.non_empty_routes() {
                self.deposit_route(route, amount);
            }
        }
    }

    /// Evaporation followed by elite reinforcement
    pub fn update(&mut self, ranked: &[Solution], rho: f64, elite: usize) {
        self.evaporate(rho);
        self.reinforce(ranked, elite);
    }
}

/// Routes of a plain greedy construction over [`SEED_ROUTES`] slots
pub fn seed_routes<S: InsertionSearch + ?Sized>(instance: &PDPTWInstance, search: &S) -> Vec<Vec<usize>> {
    greedy_routes(instance, search, SEED_ROUTES)
}
