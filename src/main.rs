//! PDPTW Solver - Command Line Interface
//!
//! Hybrid Ant Colony Optimization + Greedy Insertion for the Pickup and
//! Delivery Problem with Time Windows.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdptw_solver::benchmark::{Benchmark, BenchmarkConfig};
use pdptw_solver::instance::{PDPTWInstance, RunParameters};
use pdptw_solver::solution::SolutionFileHeader;
use pdptw_solver::solver::{Coverage, HybridSolver};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdptw-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Hybrid ACO + greedy insertion solver for the PDPTW")]
struct Cli {
    /// Defaults to `solve` on input.txt / output.txt
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance and write the solution file
    Solve(SolveArgs),

    /// Repeat seeded solves of an instance and report statistics
    Benchmark {
        /// Path to the instance file
        #[arg(short, long, default_value = "input.txt")]
        input: PathBuf,

        /// Number of runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Seed of the first run
        #[arg(long, default_value = "0")]
        first_seed: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Run the seeds in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long, default_value = "input.txt")]
        input: PathBuf,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Path to the instance file
    #[arg(short, long, default_value = "input.txt")]
    input: PathBuf,

    /// Path of the solution file
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Starting route count, overrides the parameter line
    #[arg(long)]
    routes: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Build the ants of an iteration in parallel
    #[arg(long)]
    parallel: bool,

    /// Also export the solution as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Default for SolveArgs {
    fn default() -> Self {
        SolveArgs {
            input: PathBuf::from("input.txt"),
            output: PathBuf::from("output.txt"),
            routes: None,
            seed: None,
            parallel: false,
            json: None,
            verbose: false,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => solve_instance(SolveArgs::default()),
        Some(Commands::Solve(args)) => solve_instance(args),
        Some(Commands::Benchmark { input, runs, first_seed, output, parallel }) => {
            run_benchmark(&input, runs, first_seed, &output, parallel)
        }
        Some(Commands::Analyze { input }) => analyze_instance(&input),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        println!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Exit with status 1 when the input file cannot be opened
fn ensure_readable(path: &Path) {
    if std::fs::File::open(path).is_err() {
        println!("Error: Cannot open file {}", path.display());
        std::process::exit(1);
    }
}

fn load(path: &Path) -> Result<(PDPTWInstance, RunParameters)> {
    ensure_readable(path);

    let params = RunParameters::from_file(path)?;
    let instance = PDPTWInstance::from_file(path)
        .with_context(|| format!("Failed to load instance {}", path.display()))?;
    Ok((instance, params))
}

fn solve_instance(args: SolveArgs) -> Result<()> {
    println!("Using input file: {}", args.input.display());
    println!("Using output file: {}", args.output.display());

    let (instance, mut params) = load(&args.input)?;
    if let Some(routes) = args.routes {
        params.num_routes = routes;
    }
    if args.seed.is_some() {
        params.config.seed = args.seed;
    }
    params.config.parallel |= args.parallel;

    println!("Number of routes: {}", params.num_routes);
    println!("Instance loaded: {}", instance.name);
    println!("Nodes: {}, Pickup pairs: {}", instance.size, instance.required_pairs());
    println!("Capacity: {}", instance.capacity);

    if args.verbose {
        println!("{}", instance.statistics());
        println!("Parameters: {:?}", params.config);
    }

    let outcome = HybridSolver::new(&instance, &params).solve(params.num_routes);
    let solution = &outcome.solution;

    match outcome.coverage {
        Coverage::Complete => {
            println!("\nAll pairs served successfully using {} routes.", solution.used_routes);
            println!("Total cost: {}", solution.total_cost);
        }
        Coverage::Incomplete { served, required } => {
            println!(
                "WARNING: Could not serve all pairs even with {} routes ({} of {} served).",
                outcome.routes_attempted, served, required
            );
        }
    }

    if args.verbose {
        println!("\n{}", solution);
    }

    solution
        .write_to_file(&args.output, &instance, &SolutionFileHeader::default())
        .with_context(|| format!("Failed to write solution to {}", args.output.display()))?;
    println!("Solution written to {}", args.output.display());

    if let Some(json_path) = args.json {
        let json = serde_json::to_string_pretty(solution)?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        println!("Solution exported to {}", json_path.display());
    }

    Ok(())
}

fn run_benchmark(input: &Path, runs: usize, first_seed: u64, output: &Path, parallel: bool) -> Result<()> {
    println!("Loading instance from {}...", input.display());
    let (instance, params) = load(input)?;

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let config = BenchmarkConfig {
        first_seed,
        parallel,
        ..Default::default()
    };
    let mut benchmark = Benchmark::new(config);

    println!("Running {} runs on {} (n={})...", runs, instance.name, instance.size);
    benchmark.run(&instance, &params, runs);

    let results_path = output.join("results.csv");
    benchmark
        .export_to_csv(&results_path)
        .context("Failed to export results")?;
    println!("\nResults exported to {}", results_path.display());

    let stats_path = output.join("statistics.csv");
    benchmark
        .export_statistics_csv(&stats_path)
        .context("Failed to export statistics")?;
    println!("Statistics exported to {}", stats_path.display());

    for stat in benchmark.statistics() {
        println!("\n{}", stat);
    }

    let report = benchmark.generate_report();
    println!("{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report).context("Failed to save report")?;
    println!("Report saved to {}", report_path.display());

    Ok(())
}

fn analyze_instance(input: &Path) -> Result<()> {
    let (instance, params) = load(input)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    println!("Run parameters:");
    println!("  Routes: {}", params.num_routes);
    println!("  {:?}", params.config);

    println!("\nPairs:");
    for &pickup in instance.pickup_nodes() {
        let Some(delivery) = instance.delivery_of(pickup) else {
            continue;
        };
        let (p, d) = (&instance.nodes[pickup], &instance.nodes[delivery]);
        let alone = instance.is_feasible(&[pickup, delivery]);
        println!(
            "  {:>4} -> {:<4} demand {:>4}  windows [{}, {}] / [{}, {}]{}",
            pickup,
            delivery,
            p.demand,
            p.early_time,
            p.late_time,
            d.early_time,
            d.late_time,
            if alone { "" } else { "  (infeasible on its own)" }
        );
    }

    Ok(())
}
