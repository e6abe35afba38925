//! Module for parsing and representing PDPTW instances.
//!
//! An instance file optionally starts with a parameter line, followed by a
//! `KEY: VALUE` header block, a `NODES` section and an `EDGES` section holding
//! the full travel-time matrix. Numeric fields are parsed leniently: a token
//! that cannot be read falls back to its documented default.
//!
//! The instance also owns the route evaluator: feasibility (precedence,
//! capacity, time windows) and travel-time cost of a single route.

use crate::error::InstanceError;
use crate::heuristics::aco::HybridConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default latest service time when a node line omits it
pub const DEFAULT_LATE_TIME: i32 = 1440;
/// Default vehicle capacity when the header omits it
pub const DEFAULT_CAPACITY: i32 = 100;
/// Default route-time bound when the header omits it
pub const DEFAULT_ROUTE_TIME: i32 = 1440;
/// Travel time used for missing or unreadable matrix entries
pub const MISSING_TRAVEL_TIME: i32 = 9999;
/// Number of routes used when no parameter line is given
pub const DEFAULT_NUM_ROUTES: usize = 3;
/// Minimum number of fields for a parameter line to be honoured
pub const PARAMETER_FIELDS: usize = 12;

/// Represents a node of a PDPTW instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier, equal to its index (0 is the depot)
    pub id: usize,
    /// Latitude, informational only
    pub lat: f64,
    /// Longitude, informational only
    pub lon: f64,
    /// Positive = pickup quantity, negative = delivery quantity, 0 = depot
    pub demand: i32,
    /// Earliest service start
    pub early_time: i32,
    /// Latest arrival
    pub late_time: i32,
    /// Time spent at the node
    pub service_duration: i32,
    /// For a delivery: the pickup it belongs to
    pub pickup_pair: Option<usize>,
    /// For a pickup: the delivery it belongs to
    pub delivery_pair: Option<usize>,
}

impl Node {
    pub fn new(
        id: usize,
        demand: i32,
        early_time: i32,
        late_time: i32,
        service_duration: i32,
    ) -> Self {
        Node {
            id,
            lat: 0.0,
            lon: 0.0,
            demand,
            early_time,
            late_time,
            service_duration,
            pickup_pair: None,
            delivery_pair: None,
        }
    }

    /// Parse one line of the `NODES` section.
    ///
    /// Layout: `id lat lon demand early late service pickup_pair delivery_pair`.
    /// A pair reference of -1 (or any negative value) means "no pair".
    fn parse_line(line: &str, index: usize) -> Self {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let field = |i: usize| parts.get(i).copied();

        Node {
            id: parse_usize(field(0), index),
            lat: parse_f64(field(1), 0.0),
            lon: parse_f64(field(2), 0.0),
            demand: parse_i32(field(3), 0),
            early_time: parse_i32(field(4), 0),
            late_time: parse_i32(field(5), DEFAULT_LATE_TIME),
            service_duration: parse_i32(field(6), 0),
            pickup_pair: parse_pair(field(7)),
            delivery_pair: parse_pair(field(8)),
        }
    }

    /// Check if this node is the depot
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// Check if this node is a pickup node (positive demand = load items)
    pub fn is_pickup(&self) -> bool {
        self.demand > 0
    }

    /// Check if this node is a delivery node (negative demand = unload items)
    pub fn is_delivery(&self) -> bool {
        self.demand < 0
    }
}

/// Represents a complete PDPTW instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PDPTWInstance {
    /// Name of the instance
    pub name: String,
    /// Free-form location label
    pub location: String,
    /// Number of nodes (including depot)
    pub size: usize,
    /// Vehicle capacity
    pub capacity: i32,
    /// Maximum route duration declared by the instance
    pub route_time: i32,
    /// List of all nodes, indexed by id
    pub nodes: Vec<Node>,
    /// Travel-time matrix, `travel_times[from][to]`
    pub travel_times: Vec<Vec<i32>>,
    /// Pickup node ids in ascending order
    pickups: Vec<usize>,
}

impl PDPTWInstance {
    /// Build an instance and check its structural invariants.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        capacity: i32,
        route_time: i32,
        nodes: Vec<Node>,
        travel_times: Vec<Vec<i32>>,
    ) -> Result<Self, InstanceError> {
        let size = nodes.len();
        if size == 0 {
            return Err(InstanceError::NoDepot);
        }
        if travel_times.len() != size {
            return Err(InstanceError::MissingMatrixRow {
                expected: size,
                found: travel_times.len(),
            });
        }
        if let Some((row, r)) = travel_times.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(InstanceError::RaggedMatrix {
                row,
                len: r.len(),
                expected: size,
            });
        }

        let pickups = nodes.iter().filter(|n| n.is_pickup()).map(|n| n.id).collect();

        let instance = PDPTWInstance {
            name: name.into(),
            location: location.into(),
            size,
            capacity,
            route_time,
            nodes,
            travel_times,
            pickups,
        };
        instance.validate()?;
        Ok(instance)
    }

    /// Verify node ids and the pickup/delivery cross references.
    fn validate(&self) -> Result<(), InstanceError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id != index {
                return Err(InstanceError::NodeIdMismatch { index, id: node.id });
            }
        }

        for node in &self.nodes {
            let (pair, back) = if node.is_pickup() {
                let pair = node.delivery_pair;
                (pair, pair.and_then(|d| self.nodes.get(d)).and_then(|d| d.pickup_pair))
            } else if node.is_delivery() {
                let pair = node.pickup_pair;
                (pair, pair.and_then(|p| self.nodes.get(p)).and_then(|p| p.delivery_pair))
            } else {
                continue;
            };

            if pair.is_none() || back != Some(node.id) {
                return Err(InstanceError::BrokenPair { node: node.id, pair });
            }
        }

        Ok(())
    }

    /// Load an instance from a file, skipping the parameter line if present
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        let content = read_file(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse the textual instance format
    pub fn parse(content: &str) -> Result<Self, InstanceError> {
        let mut lines = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .peekable();

        if lines.peek().is_some_and(|l| is_parameter_line(l)) {
            lines.next();
        }

        let mut header: HashMap<&str, &str> = HashMap::new();
        let mut has_nodes = false;
        for line in lines.by_ref() {
            if line == "NODES" {
                has_nodes = true;
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                header.insert(key.trim(), value.trim());
            }
        }
        if !has_nodes {
            return Err(InstanceError::MissingSection("NODES"));
        }

        let size = parse_usize(header.get("SIZE").copied(), 0);

        let mut nodes = Vec::with_capacity(size);
        for index in 0..size {
            let line = lines.next().ok_or(InstanceError::MissingNodeLine {
                expected: size,
                found: index,
            })?;
            nodes.push(Node::parse_line(line, index));
        }

        if !lines.by_ref().any(|l| l == "EDGES") {
            return Err(InstanceError::MissingSection("EDGES"));
        }

        let mut travel_times = Vec::with_capacity(size);
        for row in 0..size {
            let line = lines.next().ok_or(InstanceError::MissingMatrixRow {
                expected: size,
                found: row,
            })?;
            let mut tokens = line.split_whitespace();
            travel_times.push(
                (0..size)
                    .map(|_| parse_i32(tokens.next(), MISSING_TRAVEL_TIME))
                    .collect(),
            );
        }

        let text = |key: &str| {
            header
                .get(key)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Unknown".to_string())
        };

        PDPTWInstance::new(
            text("NAME"),
            text("LOCATION"),
            parse_i32(header.get("CAPACITY").copied(), DEFAULT_CAPACITY),
            parse_i32(header.get("ROUTE-TIME").copied(), DEFAULT_ROUTE_TIME),
            nodes,
            travel_times,
        )
    }

    /// Get the travel time between two nodes
    #[inline]
    pub fn travel(&self, from: usize, to: usize) -> i64 {
        self.travel_times[from][to] as i64
    }

    /// The depot node
    #[inline]
    pub fn depot(&self) -> &Node {
        &self.nodes[0]
    }

    /// All pickup node ids, ascending
    pub fn pickup_nodes(&self) -> &[usize] {
        &self.pickups
    }

    /// All delivery node ids, ascending
    pub fn delivery_nodes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.is_delivery())
            .map(|n| n.id)
            .collect()
    }

    /// Number of pickup/delivery pairs that must be served
    pub fn required_pairs(&self) -> usize {
        self.pickups.len()
    }

    /// Delivery node paired with a pickup
    pub fn delivery_of(&self, pickup: usize) -> Option<usize> {
        self.nodes.get(pickup).and_then(|n| n.delivery_pair)
    }

    /// Check a route (depot excluded) against precedence, capacity and time windows.
    ///
    /// Arrival at a node must not exceed its `late_time`; the vehicle then
    /// waits until `early_time` and spends `service_duration` there. The
    /// return to the depot must happen before the depot's `late_time`.
    pub fn is_feasible(&self, route: &[usize]) -> bool {
        let Some(&last) = route.last() else {
            return true;
        };

        let mut time: i64 = 0;
        let mut load: i64 = 0;
        let mut visited_pickup = vec![false; self.size];
        let mut previous = 0;

        for &node_id in route {
            let Some(node) = self.nodes.get(node_id) else {
                return false;
            };
            if node.is_depot() {
                return false;
            }

            time += self.travel(previous, node_id);
            if time > node.late_time as i64 {
                return false;
            }
            time = time.max(node.early_time as i64) + node.service_duration as i64;

            if node.is_delivery() {
                let served = node
                    .pickup_pair
                    .and_then(|p| visited_pickup.get(p).copied())
                    .unwrap_or(false);
                if !served {
                    return false;
                }
            }
            if node.is_pickup() {
                visited_pickup[node_id] = true;
            }

            load += node.demand as i64;
            if load > self.capacity as i64 || load < 0 {
                return false;
            }

            previous = node_id;
        }

        time + self.travel(last, 0) <= self.depot().late_time as i64
    }

    /// Total travel time of a route including both depot legs
    pub fn route_cost(&self, route: &[usize]) -> i64 {
        let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
            return 0;
        };

        let inner: i64 = route.windows(2).map(|w| self.travel(w[0], w[1])).sum();
        self.travel(0, first) + inner + self.travel(last, 0)
    }

    /// Check whether inserting a pair at the given positions keeps the route feasible
    pub fn is_feasible_insertion(
        &self,
        route: &[usize],
        pickup: usize,
        delivery: usize,
        pickup_pos: usize,
        delivery_pos: usize,
    ) -> bool {
        insert_pair(route, pickup, delivery, pickup_pos, delivery_pos)
            .is_some_and(|candidate| self.is_feasible(&candidate))
    }

    /// Cost increase of a feasible pair insertion, `None` if infeasible
    pub fn insertion_delta(
        &self,
        route: &[usize],
        pickup: usize,
        delivery: usize,
        pickup_pos: usize,
        delivery_pos: usize,
    ) -> Option<i64> {
        let candidate = insert_pair(route, pickup, delivery, pickup_pos, delivery_pos)?;
        if !self.is_feasible(&candidate) {
            return None;
        }
        Some(self.route_cost(&candidate) - self.route_cost(route))
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let total_pickup: i32 = self
            .nodes
            .iter()
            .filter(|n| n.is_pickup())
            .map(|n| n.demand)
            .sum();

        let travel: Vec<i64> = (0..self.size)
            .flat_map(|i| (0..self.size).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.travel(i, j))
            .collect();
        let avg_travel_time = if travel.is_empty() {
            0.0
        } else {
            travel.iter().sum::<i64>() as f64 / travel.len() as f64
        };
        let max_travel_time = travel.iter().copied().max().unwrap_or(0);

        InstanceStatistics {
            name: self.name.clone(),
            location: self.location.clone(),
            size: self.size,
            capacity: self.capacity,
            route_time: self.route_time,
            num_pairs: self.required_pairs(),
            num_deliveries: self.delivery_nodes().len(),
            total_pickup,
            horizon: self.depot().late_time,
            avg_travel_time,
            max_travel_time,
        }
    }
}

/// Materialize a route with a pair inserted.
///
/// The delivery goes in first at `delivery_pos`, then the pickup at
/// `pickup_pos`, so both indices refer to the original route. Returns `None`
/// when the delivery would precede the pickup or a position is out of range.
pub fn insert_pair(
    route: &[usize],
    pickup: usize,
    delivery: usize,
    pickup_pos: usize,
    delivery_pos: usize,
) -> Option<Vec<usize>> {
    if delivery_pos < pickup_pos || delivery_pos > route.len() {
        return None;
    }

    let mut candidate = Vec::with_capacity(route.len() + 2);
    candidate.extend_from_slice(route);
    candidate.insert(delivery_pos, delivery);
    candidate.insert(pickup_pos, pickup);
    Some(candidate)
}

/// Statistics about a PDPTW instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub location: String,
    pub size: usize,
    pub capacity: i32,
    pub route_time: i32,
    pub num_pairs: usize,
    pub num_deliveries: usize,
    pub total_pickup: i32,
    pub horizon: i32,
    pub avg_travel_time: f64,
    pub max_travel_time: i64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {} ({})", self.name, self.location)?;
        writeln!(f, "  Nodes: {} (1 depot + {} customers)", self.size, self.size.saturating_sub(1))?;
        writeln!(f, "  Pickup pairs: {}", self.num_pairs)?;
        writeln!(f, "  Delivery nodes: {}", self.num_deliveries)?;
        writeln!(f, "  Capacity: {}", self.capacity)?;
        writeln!(f, "  Route time: {}", self.route_time)?;
        writeln!(f, "  Depot horizon: {}", self.horizon)?;
        writeln!(f, "  Total pickup load: {}", self.total_pickup)?;
        writeln!(f, "  Avg travel time: {:.2}", self.avg_travel_time)?;
        writeln!(f, "  Max travel time: {}", self.max_travel_time)
    }
}

/// Route count and algorithm parameters read from the optional first line
#[derive(Debug, Clone)]
pub struct RunParameters {
    pub num_routes: usize,
    pub config: HybridConfig,
}

impl Default for RunParameters {
    fn default() -> Self {
        RunParameters {
            num_routes: DEFAULT_NUM_ROUTES,
            config: HybridConfig::default(),
        }
    }
}

impl RunParameters {
    /// Parse a parameter line.
    ///
    /// Returns `None` when the line is not a parameter line at all. A line
    /// with fewer than twelve fields yields the defaults; individual fields
    /// that cannot be parsed fall back to their own default.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if !is_parameter_line(line) {
            return None;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < PARAMETER_FIELDS {
            log::warn!(
                "Not enough parameters in first line ({} of {}), using defaults",
                fields.len(),
                PARAMETER_FIELDS
            );
            return Some(RunParameters::default());
        }

        let d = HybridConfig::default();
        let f = |i: usize| fields.get(i).copied();
        let params = RunParameters {
            num_routes: parse_usize(f(0), DEFAULT_NUM_ROUTES),
            config: HybridConfig {
                num_ants: parse_usize(f(1), d.num_ants),
                max_iterations: parse_usize(f(2), d.max_iterations),
                alpha: parse_f64(f(3), d.alpha),
                beta: parse_f64(f(4), d.beta),
                rho: parse_f64(f(5), d.rho),
                tau_max: parse_f64(f(6), d.tau_max),
                tau_min: parse_f64(f(7), d.tau_min),
                greedy_bias: parse_f64(f(8), d.greedy_bias),
                elite_solutions: parse_usize(f(9), d.elite_solutions),
                local_search_prob: parse_f64(f(10), d.local_search_prob),
                restart_threshold: parse_usize(f(11), d.restart_threshold),
                ..d
            },
        };
        log::info!("Parameters loaded from file: routes={} {:?}", params.num_routes, params.config);
        Some(params)
    }

    /// Extract parameters from the first non-empty line of an instance file's content
    pub fn from_content(content: &str) -> Self {
        let first = content.lines().map(str::trim).find(|l| !l.is_empty());
        match first.and_then(RunParameters::parse_line) {
            Some(params) => params,
            None => {
                log::info!("No parameters found in first line, using defaults");
                RunParameters::default()
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        let content = read_file(path.as_ref())?;
        Ok(Self::from_content(&content))
    }
}

fn read_file(path: &Path) -> Result<String, InstanceError> {
    fs::read_to_string(path).map_err(|source| InstanceError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// A parameter line starts with a digit or a decimal point
fn is_parameter_line(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// Integer token; a decimal token is truncated.
///
/// The whole token must be numeric: a token with trailing garbage such as
/// `12abc` is unreadable and falls back to the caller's default rather than
/// yielding its numeric prefix.
fn parse_int(token: Option<&str>) -> Option<i64> {
    let token = token?.trim();
    token.parse::<i64>().ok().or_else(|| {
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

pub(crate) fn parse_i32(token: Option<&str>, default: i32) -> i32 {
    parse_int(token)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(default)
}

pub(crate) fn parse_usize(token: Option<&str>, default: usize) -> usize {
    parse_int(token)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

pub(crate) fn parse_f64(token: Option<&str>, default: f64) -> f64 {
    token
        .and_then(|t| t.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

fn parse_pair(token: Option<&str>) -> Option<usize> {
    usize::try_from(parse_i32(token, -1)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "\
2 5 20 1.5 3.0 0.2 40 0.05 0.9 3 0.5 7
NAME: sample
LOCATION: somewhere
SIZE: 3
CAPACITY: 10
ROUTE-TIME: 480
NODES
0 10.5 106.7 0 0 500 0 -1 -1
1 10.6 106.8 4 0 300 5 -1 2
2 10.7 106.9 -4 0 400 5 1 -1
EDGES
0 3 4
3 0 2
4 2 0
";

    #[test]
    fn test_node_types() {
        let pickup = Node::new(1, 5, 0, 100, 0);
        let delivery = Node::new(2, -5, 0, 100, 0);
        let depot = Node::new(0, 0, 0, 100, 0);

        assert!(pickup.is_pickup());
        assert!(!pickup.is_delivery());
        assert!(delivery.is_delivery());
        assert!(depot.is_depot());
        assert!(!depot.is_pickup() && !depot.is_delivery());
    }

    #[test]
    fn test_parse_instance() {
        let instance = PDPTWInstance::parse(SAMPLE).unwrap();

        assert_eq!(instance.name, "sample");
        assert_eq!(instance.location, "somewhere");
        assert_eq!(instance.size, 3);
        assert_eq!(instance.capacity, 10);
        assert_eq!(instance.route_time, 480);
        assert_eq!(instance.pickup_nodes(), &[1]);
        assert_eq!(instance.delivery_of(1), Some(2));
        assert_eq!(instance.nodes[2].pickup_pair, Some(1));
        assert_eq!(instance.nodes[1].service_duration, 5);
        assert_eq!(instance.travel(1, 2), 2);
        assert_eq!(instance.travel(2, 0), 4);
    }

    #[test]
    fn test_parse_defaults_for_bad_tokens() {
        let content = "\
NAME: lenient
SIZE: 3
NODES
0 x y 0 0 abc 0 -1 -1
1 0 0 4 0 300 0 -1 2
2 0 0 -4 0 300 0 1 -1
EDGES
0 3 oops
3 0 2
4 2
";
        let instance = PDPTWInstance::parse(content).unwrap();

        assert_eq!(instance.capacity, DEFAULT_CAPACITY);
        assert_eq!(instance.route_time, DEFAULT_ROUTE_TIME);
        assert_eq!(instance.location, "Unknown");
        assert_eq!(instance.nodes[0].late_time, DEFAULT_LATE_TIME);
        assert_eq!(instance.nodes[0].lat, 0.0);
        assert_eq!(instance.travel(0, 2), MISSING_TRAVEL_TIME as i64);
        assert_eq!(instance.travel(2, 2), MISSING_TRAVEL_TIME as i64);
    }

    #[test]
    fn test_parse_structural_errors() {
        let missing_edges = "SIZE: 1\nNODES\n0 0 0 0 0 100 0 -1 -1\n";
        assert!(matches!(
            PDPTWInstance::parse(missing_edges),
            Err(InstanceError::MissingSection("EDGES"))
        ));

        let short_nodes = "SIZE: 3\nNODES\n0 0 0 0 0 100 0 -1 -1\nEDGES\n";
        assert!(matches!(
            PDPTWInstance::parse(short_nodes),
            Err(InstanceError::MissingNodeLine { expected: 3, .. })
        ));

        let broken = SAMPLE.replace("2 10.7 106.9 -4 0 400 5 1 -1", "2 10.7 106.9 -4 0 400 5 -1 -1");
        assert!(matches!(
            PDPTWInstance::parse(&broken),
            Err(InstanceError::BrokenPair { .. })
        ));
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(parse_i32(Some(" 42 "), -7), 42);
        assert_eq!(parse_i32(Some("12.9"), -7), 12);
        assert_eq!(parse_i32(Some("12abc"), -7), -7);
        assert_eq!(parse_i32(None, -7), -7);
        assert_eq!(parse_usize(Some("-3"), 5), 5);
        assert_eq!(parse_f64(Some("0.5x"), 0.25), 0.25);
    }

    #[test]
    fn test_parameter_line() {
        let params = RunParameters::from_content(SAMPLE);
        assert_eq!(params.num_routes, 2);
        assert_eq!(params.config.num_ants, 5);
        assert_eq!(params.config.max_iterations, 20);
        assert_eq!(params.config.alpha, 1.5);
        assert_eq!(params.config.elite_solutions, 3);
        assert_eq!(params.config.restart_threshold, 7);

        let short = RunParameters::parse_line("4 10 100").unwrap();
        assert_eq!(short.num_routes, DEFAULT_NUM_ROUTES);
        assert_eq!(short.config.num_ants, HybridConfig::default().num_ants);

        let partial = RunParameters::parse_line("5 bad 50 2 5 0.1 50 0.01 x 4 0.7 9").unwrap();
        assert_eq!(partial.num_routes, 5);
        assert_eq!(partial.config.num_ants, 10);
        assert_eq!(partial.config.max_iterations, 50);
        assert_eq!(partial.config.greedy_bias, 0.85);

        assert!(RunParameters::parse_line("NAME: x").is_none());
        assert_eq!(RunParameters::from_content("NAME: x\n").num_routes, DEFAULT_NUM_ROUTES);
    }

    #[test]
    fn test_route_cost() {
        let instance = single_pair_instance();

        assert_eq!(instance.route_cost(&[]), 0);
        assert_eq!(instance.route_cost(&[1]), instance.travel(0, 1) + instance.travel(1, 0));
        assert_eq!(instance.route_cost(&[1, 2]), 3 + 4 + 5);
    }

    #[test]
    fn test_feasibility_rules() {
        let instance = single_pair_instance();

        assert!(instance.is_feasible(&[]));
        assert!(instance.is_feasible(&[1, 2]));
        // Delivery before its pickup
        assert!(!instance.is_feasible(&[2, 1]));
        assert!(!instance.is_feasible(&[2]));
        // Depot is implicit
        assert!(!instance.is_feasible(&[0, 1, 2]));

        let late = unreachable_delivery_instance();
        assert!(!late.is_feasible(&[1, 2]));
    }

    #[test]
    fn test_feasibility_capacity() {
        let instance = two_pair_instance();

        // Both pickups on board exceed capacity 8
        assert!(!instance.is_feasible(&[1, 3, 2, 4]));
        assert!(instance.is_feasible(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_feasible_insertion() {
        let instance = two_pair_instance();
        let route = vec![1, 2];

        assert!(!instance.is_feasible_insertion(&route, 3, 4, 1, 0));
        assert!(instance.is_feasible_insertion(&route, 3, 4, 2, 2));
        assert_eq!(insert_pair(&route, 3, 4, 0, 0), Some(vec![3, 4, 1, 2]));
        assert_eq!(insert_pair(&route, 3, 4, 0, 2), Some(vec![3, 1, 2, 4]));
        assert_eq!(insert_pair(&route, 3, 4, 0, 3), None);

        let delta = instance.insertion_delta(&route, 3, 4, 2, 2).unwrap();
        assert_eq!(delta, instance.route_cost(&[1, 2, 3, 4]) - instance.route_cost(&route));
    }

    proptest! {
        #[test]
        fn feasible_routes_respect_load_and_precedence(
            route in proptest::sample::subsequence(vec![1usize, 2, 3, 4], 0..=4).prop_shuffle()
        ) {
            let instance = two_pair_instance();
            if instance.is_feasible(&route) {
                let mut load = 0;
                for (index, &node_id) in route.iter().enumerate() {
                    let node = &instance.nodes[node_id];
                    load += node.demand;
                    prop_assert!(load >= 0 && load <= instance.capacity);
                    if let Some(pickup) = node.pickup_pair {
                        let pickup_index = route.iter().position(|&n| n == pickup);
                        prop_assert!(pickup_index.is_some_and(|p| p < index));
                    }
                }
            }
        }
    }
}
