//! Benchmarking module for the PDPTW solver.
//!
//! Repeats seeded solves of an instance, collects one row per run and
//! aggregates cost, route and timing statistics per instance.

use crate::instance::{PDPTWInstance, RunParameters};
use crate::solver::solve;

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of a single seeded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Seed of the run
    pub seed: u64,
    /// Route count of the last escalation attempt
    pub routes_attempted: usize,
    /// Non-empty routes in the returned solution
    pub used_routes: usize,
    /// Total travel time
    pub total_cost: i64,
    pub pairs_served: usize,
    pub required_pairs: usize,
    /// Whether every pair was served
    pub complete: bool,
    /// Colony iterations of the final attempt
    pub iterations: Option<usize>,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics over the runs of one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    pub instance: String,
    pub num_runs: usize,
    pub complete_runs: usize,
    pub best_cost: f64,
    pub worst_cost: f64,
    pub mean_cost: f64,
    pub std_cost: f64,
    pub min_routes: usize,
    pub mean_routes: f64,
    pub mean_time: f64,
    pub median_time: f64,
}

impl std::fmt::Display for BenchmarkStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.instance)?;
        writeln!(f, "  Runs: {} ({} complete)", self.num_runs, self.complete_runs)?;
        writeln!(
            f,
            "  Cost: best {:.0}, worst {:.0}, mean {:.2} (std {:.2})",
            self.best_cost, self.worst_cost, self.mean_cost, self.std_cost
        )?;
        writeln!(f, "  Routes: min {}, mean {:.2}", self.min_routes, self.mean_routes)?;
        writeln!(f, "  Time: mean {:.4}s, median {:.4}s", self.mean_time, self.median_time)?;
        Ok(())
    }
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Seed of the first run; run `k` uses `first_seed + k`
    pub first_seed: u64,
    /// Run the seeds on the rayon pool
    pub parallel: bool,
    /// Show a progress bar
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            first_seed: 0,
            parallel: false,
            show_progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Solve `instance` `runs` times with consecutive seeds
    pub fn run(&mut self, instance: &PDPTWInstance, params: &RunParameters, runs: usize) -> &[RunResult] {
        log::info!("Running benchmark on instance: {} ({} runs)", instance.name, runs);

        let progress = if self.config.show_progress {
            let bar = ProgressBar::new(runs as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} runs [{elapsed_precise}]") {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let seeds: Vec<u64> = (0..runs as u64).map(|k| self.config.first_seed + k).collect();
        let single_run = |&seed: &u64| {
            let result = run_once(instance, params, seed);
            progress.inc(1);
            result
        };

        let mut batch: Vec<RunResult> = if self.config.parallel {
            seeds.par_iter().map(single_run).collect()
        } else {
            seeds.iter().map(single_run).collect()
        };
        progress.finish_and_clear();

        let start = self.results.len();
        self.results.append(&mut batch);
        &self.results[start..]
    }

    /// Compute statistics for each instance
    pub fn statistics(&self) -> Vec<BenchmarkStatistics> {
        let mut by_instance: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for result in &self.results {
            by_instance.entry(result.instance.as_str()).or_default().push(result);
        }

        by_instance
            .into_iter()
            .map(|(name, runs)| summarize(name, &runs))
            .collect()
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       PDPTW Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        report.push_str(&format!(
            "{:<20} {:>8} {:>10} {:>10} {:>12} {:>10} {:>10}\n",
            "Instance", "Runs", "Complete", "Best", "Mean Cost", "Routes", "Avg Time"
        ));
        report.push_str(&"-".repeat(86));
        report.push('\n');

        for stat in self.statistics() {
            report.push_str(&format!(
                "{:<20} {:>8} {:>10} {:>10.0} {:>12.2} {:>10} {:>10.4}\n",
                stat.instance,
                stat.num_runs,
                stat.complete_runs,
                stat.best_cost,
                stat.mean_cost,
                stat.min_routes,
                stat.mean_time
            ));
        }

        report.push_str(&"-".repeat(86));
        report.push('\n');
        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}

fn run_once(instance: &PDPTWInstance, params: &RunParameters, seed: u64) -> RunResult {
    let mut params = params.clone();
    params.config.seed = Some(seed);

    let outcome = solve(instance, &params);
    let solution = &outcome.solution;

    RunResult {
        instance: instance.name.clone(),
        seed,
        routes_attempted: outcome.routes_attempted,
        used_routes: solution.used_routes,
        total_cost: solution.total_cost,
        pairs_served: solution.served_pairs(),
        required_pairs: instance.required_pairs(),
        complete: outcome.coverage.is_complete(),
        iterations: solution.iterations,
        time: solution.computation_time,
    }
}

fn summarize(instance: &str, runs: &[&RunResult]) -> BenchmarkStatistics {
    let costs: Vec<f64> = runs.iter().map(|r| r.total_cost as f64).collect();
    let routes: Vec<f64> = runs.iter().map(|r| r.used_routes as f64).collect();
    let mut times: Vec<f64> = runs.iter().map(|r| r.time).collect();
    times.sort_by_key(|&t| OrderedFloat(t));

    let std_cost = if costs.len() > 1 { costs.iter().std_dev() } else { 0.0 };
    let median_time = match times.len() {
        0 => 0.0,
        n if n % 2 == 1 => times[n / 2],
        n => (times[n / 2 - 1] + times[n / 2]) / 2.0,
    };

    BenchmarkStatistics {
        instance: instance.to_string(),
        num_runs: runs.len(),
        complete_runs: runs.iter().filter(|r| r.complete).count(),
        best_cost: Statistics::min(costs.iter()),
        worst_cost: Statistics::max(costs.iter()),
        mean_cost: costs.iter().mean(),
        std_cost,
        min_routes: runs.iter().map(|r| r.used_routes).min().unwrap_or(0),
        mean_routes: routes.iter().mean(),
        mean_time: times.iter().mean(),
        median_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::aco::HybridConfig;
    use crate::test_utils::*;

    fn quiet() -> BenchmarkConfig {
        BenchmarkConfig {
            show_progress: false,
            ..BenchmarkConfig::default()
        }
    }

    fn small_params() -> RunParameters {
        RunParameters {
            num_routes: 2,
            config: HybridConfig {
                num_ants: 4,
                max_iterations: 5,
                ..HybridConfig::default()
            },
        }
    }

    #[test]
    fn test_benchmark_runs_consecutive_seeds() {
        let instance = two_pair_instance();
        let mut benchmark = Benchmark::new(BenchmarkConfig { first_seed: 10, ..quiet() });

        let results = benchmark.run(&instance, &small_params(), 3);
        let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12]);
        assert!(results.iter().all(|r| r.complete && r.pairs_served == 2));
    }

    #[test]
    fn test_parallel_benchmark_matches_sequential() {
        let instance = two_pair_instance();
        let mut sequential = Benchmark::new(quiet());
        let mut parallel = Benchmark::new(BenchmarkConfig { parallel: true, ..quiet() });

        let a: Vec<(u64, i64)> = sequential
            .run(&instance, &small_params(), 4)
            .iter()
            .map(|r| (r.seed, r.total_cost))
            .collect();
        let b: Vec<(u64, i64)> = parallel
            .run(&instance, &small_params(), 4)
            .iter()
            .map(|r| (r.seed, r.total_cost))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_statistics() {
        let instance = single_pair_instance();
        let mut benchmark = Benchmark::new(quiet());
        benchmark.run(&instance, &small_params(), 3);

        let stats = benchmark.statistics();
        assert_eq!(stats.len(), 1);

        let stat = &stats[0];
        assert_eq!(stat.num_runs, 3);
        assert_eq!(stat.complete_runs, 3);
        assert_eq!(stat.best_cost, 12.0);
        assert_eq!(stat.worst_cost, 12.0);
        assert_eq!(stat.mean_cost, 12.0);
        assert_eq!(stat.std_cost, 0.0);
        assert_eq!(stat.min_routes, 1);
    }

    #[test]
    fn test_single_run_has_zero_spread() {
        let instance = single_pair_instance();
        let mut benchmark = Benchmark::new(quiet());
        benchmark.run(&instance, &small_params(), 1);

        let stat = &benchmark.statistics()[0];
        assert_eq!(stat.std_cost, 0.0);
        assert_eq!(stat.median_time, benchmark.results()[0].time);
    }

    #[test]
    fn test_report_lists_instances() {
        let instance = single_pair_instance();
        let mut benchmark = Benchmark::new(quiet());
        benchmark.run(&instance, &small_params(), 2);

        let report = benchmark.generate_report();
        assert!(report.contains("PDPTW Benchmark Report"));
        assert!(report.contains("test"));
    }

    #[test]
    fn test_csv_export() {
        let instance = single_pair_instance();
        let mut benchmark = Benchmark::new(quiet());
        benchmark.run(&instance, &small_params(), 2);

        let dir = std::env::temp_dir().join(format!("pdptw-bench-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let results_path = dir.join("results.csv");
        let stats_path = dir.join("statistics.csv");

        benchmark.export_to_csv(&results_path).unwrap();
        benchmark.export_statistics_csv(&stats_path).unwrap();

        let results = std::fs::read_to_string(&results_path).unwrap();
        assert!(results.starts_with("instance,seed,routes_attempted"));
        assert_eq!(results.lines().count(), 3);

        let stats = std::fs::read_to_string(&stats_path).unwrap();
        assert_eq!(stats.lines().count(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
