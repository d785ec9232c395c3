//! Command line entry point: load an instance, run the search, report the best solution.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use vessel_pdp::config::Config;
use vessel_pdp::problem::Problem;
use vessel_pdp::utils::{format_duration, save_solution};

#[derive(Parser, Debug)]
#[command(name = "vessel-pdp", version, about = "Simulated annealing for vessel pickup and delivery")]
struct Args {
    /// Instance file in the vessel/cargo text format
    instance: PathBuf,

    /// Iteration budget of every run
    #[arg(short, long, default_value_t = 10_000)]
    iterations: usize,

    /// Number of independent runs
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    /// Seed of the first run; run i uses seed + i
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Search configuration as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a report of the best solution to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<Config>(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => Config::default(),
    };

    let problem = Problem::from_file(&args.instance)?;
    log::info!(
        "loaded {}: {} ports, {} vessels, {} cargoes",
        problem.name,
        problem.port_count,
        problem.vessel_count(),
        problem.cargo_count()
    );

    let summary = vessel_pdp::run_many(&problem, &config, args.iterations, args.runs, args.seed)?;
    let best = &summary.best;

    println!("Instance: {}", problem.name);
    println!("Runs: {} x {} iterations", args.runs, args.iterations);
    println!("Average objective: {:.1}", summary.average_cost);
    println!("Best objective: {}", best.best_cost);
    println!("Improvement over standard solution: {:.2}%", summary.improvement());
    println!("Average runtime: {}", format_duration(summary.average_runtime));
    println!("Best solution: {:?}", best.best.sequence);
    println!();
    println!("{}", best.statistics.format());

    if let Some(path) = &args.output {
        save_solution(&best.best, &problem, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("saved best solution to {}", path.display());
    }

    Ok(())
}
