//! Hybrid Ant Colony Optimization for PDPTW.
//!
//! Ants build solutions pair by pair. At every step an ant either takes
//! the pair with the cheapest feasible insertion (greedy step, taken with
//! probability `greedy_bias`) or samples a pair by roulette over pheromone
//! and travel-time attractiveness. The chosen pair is always placed at its
//! cheapest feasible insertion. Ant solutions may be refined by 2-opt and
//! the elite of each iteration reinforces the trail matrix.

use crate::heuristics::construction::{cheapest_insertion, greedy_routes};
use crate::heuristics::insertion::{ExhaustiveInsertion, InsertionSearch};
use crate::heuristics::local_search::{LocalSearch, TwoOptSearch};
use crate::heuristics::pheromone::{self, PheromoneMatrix};
use crate::instance::PDPTWInstance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Offset added to both terms of the pheromone score
const SCORE_OFFSET: f64 = 0.1;

/// Hybrid ACO configuration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridConfig {
    /// Ants per iteration
    pub num_ants: usize,
    /// Number of iterations
    pub max_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub rho: f64,
    /// Upper trail bound; read from input but not enforced
    pub tau_max: f64,
    /// Lower trail bound; read from input but not enforced
    pub tau_min: f64,
    /// Probability of a greedy construction step
    pub greedy_bias: f64,
    /// Number of best solutions reinforcing the trails each iteration
    pub elite_solutions: usize,
    /// Probability of applying 2-opt to an ant solution
    pub local_search_prob: f64,
    /// Iterations without improvement before stopping
    pub restart_threshold: usize,
    /// Random seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Build the ants of an iteration on the rayon pool
    pub parallel: bool,
}

impl Default for HybridConfig {
    fn default() -> Self {
        HybridConfig {
            num_ants: 10,
            max_iterations: 100,
            alpha: 2.0,
            beta: 5.0,
            rho: 0.1,
            tau_max: 50.0,
            tau_min: 0.01,
            greedy_bias: 0.85,
            elite_solutions: 4,
            local_search_prob: 0.7,
            restart_threshold: 9,
            seed: None,
            parallel: false,
        }
    }
}

/// How an ant picks the next pair to insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    Greedy,
    Pheromone,
}

impl SelectionStrategy {
    /// Greedy with probability `greedy_bias`, pheromone roulette otherwise
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, greedy_bias: f64) -> Self {
        if rng.gen::<f64>() < greedy_bias {
            SelectionStrategy::Greedy
        } else {
            SelectionStrategy::Pheromone
        }
    }
}

/// Shared, read-only state an ant builds against
pub struct ConstructionContext<'a, S: InsertionSearch + ?Sized> {
    pub instance: &'a PDPTWInstance,
    pub pheromone: &'a PheromoneMatrix,
    pub search: &'a S,
    pub config: &'a HybridConfig,
}

/// Attractiveness of a pickup for the pheromone roulette.
///
/// Sums trail levels and `1 / (t + 1)` over every node `j` reachable with a
/// positive travel time `t`, then scores
/// `(trail + 0.1)^alpha * (heuristic + 0.1)^beta`.
pub fn pheromone_score(
    instance: &PDPTWInstance,
    pheromone: &PheromoneMatrix,
    pickup: usize,
    alpha: f64,
    beta: f64,
) -> f64 {
    let mut trail = 0.0;
    let mut heuristic = 0.0;

    for (j, &t) in instance.travel_times[pickup].iter().enumerate() {
        if t > 0 {
            trail += pheromone.get(pickup, j);
            heuristic += 1.0 / (t as f64 + 1.0);
        }
    }

    (trail + SCORE_OFFSET).powf(alpha) * (heuristic + SCORE_OFFSET).powf(beta)
}

/// Roulette-wheel pick over `(pickup, score)` candidates.
///
/// Returns the first candidate whose cumulative score reaches the drawn
/// threshold, the last one if rounding leaves it unreached, and the first
/// one when all scores are zero.
pub fn select_pheromone<R: Rng + ?Sized>(rng: &mut R, scored: &[(usize, f64)]) -> Option<usize> {
    let (first, _) = *scored.first()?;

    let total: f64 = scored.iter().map(|&(_, s)| s).sum();
    if total == 0.0 {
        return Some(first);
    }

    let threshold = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for &(pickup, score) in scored {
        cumulative += score;
        if threshold <= cumulative {
            return Some(pickup);
        }
    }

    scored.last().map(|&(pickup, _)| pickup)
}

/// A single ant with its own random stream
pub struct HybridAnt<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl HybridAnt<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        HybridAnt {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> HybridAnt<R> {
    pub fn new(rng: R) -> Self {
        HybridAnt { rng }
    }

    /// Build one solution over `num_routes` route slots.
    ///
    /// Construction stops when every pair is placed, when a greedy step
    /// finds no insertable pair, or when the pair drawn by the roulette has
    /// no feasible insertion. Remaining pairs stay unserved.
    pub fn construct_solution<S: InsertionSearch + ?Sized>(
        &mut self,
        ctx: &ConstructionContext<'_, S>,
        num_routes: usize,
    ) -> Solution {
        let instance = ctx.instance;
        let mut routes = vec![Vec::new(); num_routes];
        let mut unplaced: BTreeSet<usize> = instance.pickup_nodes().iter().copied().collect();

        while !unplaced.is_empty() {
            let insertion = match SelectionStrategy::draw(&mut self.rng, ctx.config.greedy_bias) {
                SelectionStrategy::Greedy => cheapest_insertion(instance, ctx.search, &routes, &unplaced),
                SelectionStrategy::Pheromone => {
                    let scored: Vec<(usize, f64)> = unplaced
                        .iter()
                        .map(|&p| {
                            let score =
                                pheromone_score(instance, ctx.pheromone, p, ctx.config.alpha, ctx.config.beta);
                            (p, score)
                        })
                        .collect();
                    select_pheromone(&mut self.rng, &scored)
                        .and_then(|p| ctx.search.best_insertion(instance, &routes, p))
                }
            };

            let Some(insertion) = insertion else {
                break;
            };
            insertion.apply(&mut routes);
            unplaced.remove(&insertion.pickup);
        }

        Solution::from_routes(instance, routes, "HybridAnt")
    }
}

/// Why a colony run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `restart_threshold` iterations passed without improvement
    Converged,
    /// All `max_iterations` iterations ran
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ColonyOutcome {
    pub solution: Solution,
    pub termination: Termination,
    pub iterations: usize,
}

/// Hybrid ACO solver
pub struct HybridAntColony<'a, S: InsertionSearch = ExhaustiveInsertion> {
    instance: &'a PDPTWInstance,
    config: HybridConfig,
    search: S,
    local_search: TwoOptSearch,
    seed_routes: Vec<Vec<usize>>,
    pheromone: PheromoneMatrix,
    rng: ChaCha8Rng,
    ant_seeds: ChaCha8Rng,
}

impl<'a> HybridAntColony<'a> {
    pub fn new(instance: &'a PDPTWInstance, config: HybridConfig) -> Self {
        Self::with_search(instance, config, ExhaustiveInsertion)
    }
}

impl<'a, S: InsertionSearch> HybridAntColony<'a, S> {
    pub fn with_search(instance: &'a PDPTWInstance, config: HybridConfig, search: S) -> Self {
        let seed_routes = pheromone::seed_routes(instance, &search);
        let pheromone = PheromoneMatrix::initialize(instance.size, &seed_routes);

        let (rng, ant_seeds) = match config.seed {
            Some(seed) => {
                let mut ant_seeds = ChaCha8Rng::seed_from_u64(seed);
                ant_seeds.set_stream(1);
                (ChaCha8Rng::seed_from_u64(seed), ant_seeds)
            }
            None => (ChaCha8Rng::from_entropy(), ChaCha8Rng::from_entropy()),
        };

        HybridAntColony {
            instance,
            config,
            search,
            local_search: TwoOptSearch::new(),
            seed_routes,
            pheromone,
            rng,
            ant_seeds,
        }
    }

    pub fn config(&self) -> &HybridConfig {
        &self.config
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    /// Run the colony over `num_routes` route slots.
    ///
    /// The trail matrix is reset from the greedy seed routes and the
    /// incumbent starts as the plain greedy solution, so the result is never
    /// worse than greedy under the `(used_routes, total_cost)` ordering.
    pub fn run(&mut self, num_routes: usize) -> ColonyOutcome {
        let start = std::time::Instant::now();
        let instance = self.instance;

        self.pheromone = PheromoneMatrix::initialize(instance.size, &self.seed_routes);

        let initial = greedy_routes(instance, &self.search, num_routes);
        let mut best = Solution::from_routes(instance, initial, "HybridACO");
        log::info!("Initial greedy solution cost: {}", best.total_cost);

        let mut no_improvement = 0;
        let mut iterations = 0;
        let mut termination = Termination::Exhausted;

        for iter in 0..self.config.max_iterations {
            iterations = iter + 1;
            let batch = self.run_iteration(num_routes);

            match batch.first() {
                Some(candidate) if candidate.is_better_than(&best) => {
                    best = candidate.clone();
                    no_improvement = 0;
                    log::info!(
                        "Iteration {}: New best cost = {}, Routes used = {}",
                        iter + 1,
                        best.total_cost,
                        best.used_routes
                    );
                }
                _ => no_improvement += 1,
            }

            self.pheromone
                .update(&batch, self.config.rho, self.config.elite_solutions);

            if no_improvement >= self.config.restart_threshold {
                log::info!("Early termination at iteration {}", iter + 1);
                termination = Termination::Converged;
                break;
            }
        }

        best.algorithm = "HybridACO".to_string();
        best.computation_time = start.elapsed().as_secs_f64();
        best.iterations = Some(iterations);

        ColonyOutcome {
            solution: best,
            termination,
            iterations,
        }
    }

    /// Build one batch of ant solutions, sorted best first.
    ///
    /// Ant seeds and 2-opt coin flips are drawn up front in ant order, so a
    /// parallel batch is identical to a sequential one.
    pub fn run_iteration(&mut self, num_routes: usize) -> Vec<Solution> {
        let plan: Vec<(u64, bool)> = (0..self.config.num_ants)
            .map(|_| {
                let seed = self.ant_seeds.gen::<u64>();
                let refine = self.rng.gen::<f64>() < self.config.local_search_prob;
                (seed, refine)
            })
            .collect();

        let ctx = ConstructionContext {
            instance: self.instance,
            pheromone: &self.pheromone,
            search: &self.search,
            config: &self.config,
        };
        let local_search = self.local_search;

        let build = |&(seed, refine): &(u64, bool)| {
            let mut solution = HybridAnt::seeded(seed).construct_solution(&ctx, num_routes);
            if refine {
                local_search.improve(ctx.instance, &mut solution);
            }
            solution
        };

        let mut batch: Vec<Solution> = if self.config.parallel {
            plan.par_iter().map(build).collect()
        } else {
            plan.iter().map(build).collect()
        };

        batch.sort_by_key(Solution::quality);
        batch
    }
}
