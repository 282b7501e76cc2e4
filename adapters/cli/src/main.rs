#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Hex Defence game.

mod scenario;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use hex_defence_world::query;
use tracing_subscriber::EnvFilter;

use crate::{scenario::Scenario, simulation::Simulation};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "hex-defence")]
#[command(about = "Runs a Hex Defence scenario without rendering")]
struct Args {
    /// Scenario file in TOML format; the built-in demo runs when omitted
    scenario: Option<PathBuf>,

    /// Simulation ticks per second
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    tick_rate: u32,

    /// Maximum simulated time in seconds
    #[arg(long, default_value_t = 600.0)]
    max_time: f64,

    /// Log filter, overrides RUST_LOG (for example `debug`)
    #[arg(long)]
    log_level: Option<String>,
}

/// Entry point for the Hex Defence command-line interface.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo()?,
    };
    let limit = Duration::try_from_secs_f64(args.max_time).context("invalid --max-time")?;
    let tick = Duration::from_secs(1) / args.tick_rate;

    let mut simulation = Simulation::new(&scenario)?;
    println!("{}", query::welcome_banner(simulation.world()));
    let summary = simulation.run(tick, limit);
    println!("{summary}");
    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
