//! Command line entry point for the stablecoin pool simulation.
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use unisim_ledger::InMemoryLedger;
use unisim_simulation::config::{DEFAULT_SEED, SimulationConfig};
use unisim_simulation::engine::SimulationEngine;

mod exporter;
mod summary;

#[derive(Parser, Debug)]
#[command(name = "unisim")]
#[command(about = "Agent-based simulation of a DIA/USDC concentrated-liquidity pool", long_about = None)]
struct Cli {
    /// Number of zero-intelligence traders
    #[arg(long, default_value_t = 100)]
    nagents: usize,

    /// Number of steps to run
    #[arg(long, default_value_t = 50)]
    nsteps: u64,

    /// Save each pool's step records as JSON
    #[arg(long)]
    save: bool,

    /// Seed for the shared random source
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Whales dumping token0 at steps 50-53 (needs at least 53 steps)
    #[arg(long, default_value_t = 0)]
    whales: usize,

    /// Directory for saved results
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = SimulationConfig::new(cli.nagents, cli.nsteps)
        .with_seed(cli.seed)
        .with_whales(cli.whales);

    println!(
        "... running the model with {} agents for {} steps ...",
        cli.nagents, cli.nsteps
    );
    let mut engine = SimulationEngine::stablecoin(InMemoryLedger::new(), config)
        .context("building the stablecoin scenario")?;
    engine.run().context("running the simulation")?;

    summary::agents_table(&engine.agent_counts()).printstd();
    let reports = engine.results();
    for report in &reports {
        println!("\n{}", report.pool);
        summary::records_table(report).printstd();
    }

    if cli.save {
        let paths = exporter::save_reports(&cli.output_dir, &reports, cli.nagents, cli.nsteps)?;
        for path in paths {
            info!(path = %path.display(), "results saved");
            println!(" ... saved results to: {} ...", path.display());
        }
    }

    Ok(())
}
