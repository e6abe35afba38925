//! Solution representation and manipulation for PDPTW.
//!
//! A solution is a fixed number of route slots, some of which may stay
//! empty. Solutions are ranked by the number of used routes first and total
//! travel time second.

use crate::instance::PDPTWInstance;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Represents a solution to the PDPTW
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Route slots; each route lists node ids, depot excluded
    pub routes: Vec<Vec<usize>>,
    /// Sum of travel times over non-empty routes
    pub total_cost: i64,
    /// Number of non-empty routes
    pub used_routes: usize,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a solution with `num_routes` empty routes
    pub fn new(num_routes: usize) -> Self {
        Solution {
            routes: vec![Vec::new(); num_routes],
            total_cost: 0,
            used_routes: 0,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from routes and compute its attributes
    pub fn from_routes(instance: &PDPTWInstance, routes: Vec<Vec<usize>>, algorithm: &str) -> Self {
        let mut solution = Solution {
            routes,
            algorithm: algorithm.to_string(),
            ..Solution::new(0)
        };
        solution.evaluate(instance);
        solution
    }

    /// Recompute `total_cost` and `used_routes`
    pub fn evaluate(&mut self, instance: &PDPTWInstance) {
        self.total_cost = self.non_empty_routes().map(|r| instance.route_cost(r)).sum();
        self.used_routes = self.non_empty_routes().count();
    }

    pub fn non_empty_routes(&self) -> impl Iterator<Item = &Vec<usize>> {
        self.routes.iter().filter(|r| !r.is_empty())
    }

    /// Ranking key: fewer routes first, then lower cost
    pub fn quality(&self) -> (usize, i64) {
        (self.used_routes, self.total_cost)
    }

    /// Strict improvement under the `(used_routes, total_cost)` ordering
    pub fn is_better_than(&self, other: &Solution) -> bool {
        self.quality() < other.quality()
    }

    /// Number of customer visits over all routes
    pub fn visited_nodes(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Number of served pairs, counted as visits / 2
    pub fn served_pairs(&self) -> usize {
        self.visited_nodes() / 2
    }

    /// Every route feasible and no node visited twice
    pub fn is_feasible(&self, instance: &PDPTWInstance) -> bool {
        let mut seen = HashSet::new();
        self.routes
            .iter()
            .all(|r| instance.is_feasible(r) && r.iter().all(|&n| seen.insert(n)))
    }

    /// Render the solution file: four header lines, a `Solution` marker and
    /// one `Route k : ...` line per non-empty route.
    pub fn to_solution_file(&self, instance: &PDPTWInstance, header: &SolutionFileHeader) -> String {
        let mut out = String::new();
        out.push_str(&format!("Instance name : {}\n", instance.name));
        out.push_str(&format!("Authors       : {}\n", header.authors));
        out.push_str(&format!("Date          : {}\n", header.date));
        out.push_str(&format!("Reference     : {}\n", header.reference));
        out.push_str("Solution\n");

        for (k, route) in self.non_empty_routes().enumerate() {
            let ids: Vec<String> = route.iter().map(|n| n.to_string()).collect();
            out.push_str(&format!("Route {} : {}\n", k + 1, ids.join(" ")));
        }

        out
    }

    /// Write the solution file to disk
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        instance: &PDPTWInstance,
        header: &SolutionFileHeader,
    ) -> std::io::Result<()> {
        fs::write(path, self.to_solution_file(instance, header))
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Routes used: {}/{}", self.used_routes, self.routes.len())?;
        writeln!(f, "  Total cost: {}", self.total_cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        for (k, route) in self.non_empty_routes().enumerate() {
            writeln!(f, "  Route {}: {:?}", k + 1, route)?;
        }
        Ok(())
    }
}

/// A pair insertion: pickup and delivery placed into one route.
///
/// Positions refer to the route before insertion; the delivery is inserted
/// first so the pickup index stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub pickup: usize,
    pub delivery: usize,
    pub route: usize,
    pub pickup_pos: usize,
    pub delivery_pos: usize,
    pub cost_increase: i64,
}

impl Insertion {
    pub fn apply(&self, routes: &mut [Vec<usize>]) {
        let route = &mut routes[self.route];
        route.insert(self.delivery_pos, self.delivery);
        route.insert(self.pickup_pos, self.pickup);
    }
}

/// Descriptive header lines of the solution file
#[derive(Debug, Clone)]
pub struct SolutionFileHeader {
    pub authors: String,
    pub date: String,
    pub reference: String,
}

impl Default for SolutionFileHeader {
    fn default() -> Self {
        SolutionFileHeader {
            authors: env!("CARGO_PKG_AUTHORS").to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            reference: "Hybrid ACO + Greedy Insertion".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new(3);
        assert_eq!(sol.routes.len(), 3);
        assert_eq!(sol.used_routes, 0);
        assert_eq!(sol.total_cost, 0);
        assert_eq!(sol.served_pairs(), 0);
    }

    #[test]
    fn test_ordering_prefers_fewer_routes() {
        let instance = two_pair_instance();
        let one_route = Solution::from_routes(&instance, vec![vec![1, 2, 3, 4], vec![]], "a");
        let two_routes = Solution::from_routes(&instance, vec![vec![1, 2], vec![3, 4]], "b");

        assert_eq!(one_route.used_routes, 1);
        assert_eq!(two_routes.used_routes, 2);
        assert!(one_route.is_better_than(&two_routes));
        assert!(!two_routes.is_better_than(&one_route));
        assert!(!one_route.is_better_than(&one_route.clone()));
    }

    #[test]
    fn test_insertion_apply() {
        let mut routes = vec![vec![1, 2], vec![]];
        let insertion = Insertion {
            pickup: 3,
            delivery: 4,
            route: 0,
            pickup_pos: 1,
            delivery_pos: 2,
            cost_increase: 0,
        };
        insertion.apply(&mut routes);
        assert_eq!(routes[0], vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_solution_file() {
        let instance = two_pair_instance();
        let sol = Solution::from_routes(&instance, vec![vec![], vec![3, 4], vec![1, 2]], "test");
        let header = SolutionFileHeader {
            authors: "me".to_string(),
            date: "2025".to_string(),
            reference: "ref".to_string(),
        };

        let text = sol.to_solution_file(&instance, &header);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Instance name : test");
        assert_eq!(lines[1], "Authors       : me");
        assert_eq!(lines[2], "Date          : 2025");
        assert_eq!(lines[3], "Reference     : ref");
        assert_eq!(lines[4], "Solution");
        assert_eq!(lines[5], "Route 1 : 3 4");
        assert_eq!(lines[6], "Route 2 : 1 2");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_solution_feasibility() {
        let instance = two_pair_instance();
        let ok = Solution::from_routes(&instance, vec![vec![1, 2], vec![3, 4]], "ok");
        let duplicate = Solution::from_routes(&instance, vec![vec![1, 2], vec![1, 2]], "dup");

        assert!(ok.is_feasible(&instance));
        assert!(!duplicate.is_feasible(&instance));
    }
}
