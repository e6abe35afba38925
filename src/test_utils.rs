use crate::heuristics::insertion::{ExhaustiveInsertion, InsertionSearch};
use crate::instance::{Node, PDPTWInstance};
use crate::solution::Insertion;

pub const WIDE: (i32, i32) = (0, 1000);

/// Matrix with `value` everywhere off the diagonal
pub fn uniform_matrix(size: usize, value: i32) -> Vec<Vec<i32>> {
    (0..size)
        .map(|i| (0..size).map(|j| if i == j { 0 } else { value }).collect())
        .collect()
}

pub fn depot(late: i32) -> Node {
    Node::new(0, 0, 0, late, 0)
}

/// Pickup `pickup` paired with delivery `pickup + 1`
pub fn pair(pickup: usize, demand: i32, pickup_window: (i32, i32), delivery_window: (i32, i32)) -> [Node; 2] {
    let delivery = pickup + 1;
    let mut p = Node::new(pickup, demand, pickup_window.0, pickup_window.1, 0);
    let mut d = Node::new(delivery, -demand, delivery_window.0, delivery_window.1, 0);
    p.delivery_pair = Some(delivery);
    d.pickup_pair = Some(pickup);
    [p, d]
}

pub fn build_instance(capacity: i32, nodes: Vec<Node>, travel_times: Vec<Vec<i32>>) -> PDPTWInstance {
    PDPTWInstance::new("test", "test", capacity, 1440, nodes, travel_times).unwrap()
}

/// Depot + pair (1, 2); 0->1 = 3, 1->2 = 4, 2->0 = 5, everything else 7
pub fn single_pair_instance() -> PDPTWInstance {
    let mut nodes = vec![depot(WIDE.1)];
    nodes.extend(pair(1, 5, WIDE, WIDE));

    let mut matrix = uniform_matrix(3, 7);
    matrix[0][1] = 3;
    matrix[1][2] = 4;
    matrix[2][0] = 5;

    build_instance(10, nodes, matrix)
}

/// Pairs (1, 2) and (3, 4), demand 5 each, capacity 8, uniform travel 10
pub fn two_pair_instance() -> PDPTWInstance {
    let mut nodes = vec![depot(WIDE.1)];
    nodes.extend(pair(1, 5, WIDE, WIDE));
    nodes.extend(pair(3, 5, WIDE, WIDE));

    build_instance(8, nodes, uniform_matrix(5, 10))
}

/// Two pairs whose windows keep them on separate routes: any fourth stop
/// arrives at 40 while deliveries close at 30.
pub fn disjoint_pairs_instance() -> PDPTWInstance {
    let mut nodes = vec![depot(WIDE.1)];
    nodes.extend(pair(1, 5, (0, 20), (0, 30)));
    nodes.extend(pair(3, 5, (0, 20), (0, 30)));

    build_instance(10, nodes, uniform_matrix(5, 10))
}

/// A single pair whose delivery closes before it can ever be reached
pub fn unreachable_delivery_instance() -> PDPTWInstance {
    let mut nodes = vec![depot(WIDE.1)];
    nodes.extend(pair(1, 5, WIDE, (0, 5)));

    build_instance(10, nodes, uniform_matrix(3, 10))
}

/// Insertion search that only ever fills the first route slot
pub struct FirstRouteOnly;

impl InsertionSearch for FirstRouteOnly {
    fn best_insertion(&self, instance: &PDPTWInstance, routes: &[Vec<usize>], pickup: usize) -> Option<Insertion> {
        ExhaustiveInsertion.best_insertion(instance, &routes[..routes.len().min(1)], pickup)
    }

    fn name(&self) -> &str {
        "FirstRouteOnly"
    }
}
