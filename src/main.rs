use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::warn;
use ring_road_sim::{ScenarioConfig, Simulation};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ring-road")]
#[command(about = "Car following on a wrap-around road with a traffic signal")]
struct Cli {
    /// JSON scenario file; missing parameters take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value = "500")]
    ticks: u64,

    /// Seed for placement and shuffling, overrides the scenario file
    #[arg(long)]
    seed: Option<u64>,

    /// Print a summary every this many ticks
    #[arg(long, default_value = "50")]
    report_every: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            ScenarioConfig::from_reader(file)
                .with_context(|| format!("invalid scenario {}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let mut sim = Simulation::from_scenario(&config).context("failed to set up scenario")?;
    print_summary(&sim);

    let report_every = cli.report_every.max(1);
    let mut degenerate = 0;
    for _ in 0..cli.ticks {
        let report = sim.step();
        degenerate += report.degenerate_gaps.len();
        if report.tick % report_every == 0 {
            print_summary(&sim);
        }
    }

    if degenerate > 0 {
        warn!("{} degenerate gaps were substituted during the run", degenerate);
    }
    println!("=== Final State ===");
    print_summary(&sim);
    Ok(())
}

fn print_summary(sim: &Simulation) {
    let stopped = sim.iter_vehicles().filter(|v| v.has_stopped()).count();
    let signals = sim
        .iter_signals()
        .map(|s| format!("{:?}", s.state()))
        .join(", ");
    println!(
        "tick {:>6}: {} vehicles, mean speed {:.3}, {} stopped, signals [{}]",
        sim.tick(),
        sim.iter_vehicles().count(),
        sim.mean_speed(),
        stopped,
        signals
    );
}
