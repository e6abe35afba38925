//! Cheapest feasible pair insertion.
//!
//! Every constructor places pairs through an [`InsertionSearch`], so a
//! smarter search (e.g. cached insertion costs) can replace the exhaustive
//! scan without touching the construction logic.

use crate::instance::PDPTWInstance;
use crate::solution::Insertion;

/// Finds where a pickup/delivery pair can be inserted most cheaply
pub trait InsertionSearch: Send + Sync {
    /// Cheapest feasible insertion of `pickup` and its delivery over all
    /// routes and positions, or `None` if the pair fits nowhere.
    fn best_insertion(
        &self,
        instance: &PDPTWInstance,
        routes: &[Vec<usize>],
        pickup: usize,
    ) -> Option<Insertion>;

    fn name(&self) -> &str;
}

/// Rescans every route and every (pickup, delivery) position pair.
///
/// Routes are scanned in slot order, pickup positions ascending, delivery
/// positions from the pickup position onwards; the first strict minimum of
/// the cost increase wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveInsertion;

impl ExhaustiveInsertion {
    pub fn new() -> Self {
        ExhaustiveInsertion
    }
}

impl InsertionSearch for ExhaustiveInsertion {
    fn best_insertion(
        &self,
        instance: &PDPTWInstance,
        routes: &[Vec<usize>],
        pickup: usize,
    ) -> Option<Insertion> {
        let delivery = instance.delivery_of(pickup)?;
        let mut best: Option<Insertion> = None;

        for (r, route) in routes.iter().enumerate() {
            for pickup_pos in 0..=route.len() {
                for delivery_pos in pickup_pos..=route.len() {
                    let Some(cost_increase) =
                        instance.insertion_delta(route, pickup, delivery, pickup_pos, delivery_pos)
                    else {
                        continue;
                    };

                    if best.map_or(true, |b| cost_increase < b.cost_increase) {
                        best = Some(Insertion {
                            pickup,
                            delivery,
                            route: r,
                            pickup_pos,
                            delivery_pos,
                            cost_increase,
                        });
                    }
                }
            }
        }

        best
    }

    fn name(&self) -> &str {
        "ExhaustiveInsertion"
    }
}
