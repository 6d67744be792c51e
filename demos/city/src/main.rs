//! city — drive a fleet across a road network through the central compute
//! node.
//!
//! Either loads a scenario directory (`subnets.csv`, `edges.csv`,
//! `vehicles.csv`) or generates a grid with random trips:
//!
//! ```text
//! city --scenario demos/city/scenario
//! city --grid 6x4 --capacity 2 --vehicles 40 --seed 7
//! RUST_LOG=debug city --grid 3x3 --vehicles 5 --cost-unit-ms 20
//! ```

mod logger;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use sdn_core::SimConfig;
use sdn_scenario::{Scenario, load_scenario_dir};
use sdn_sim::{LoggingObserver, SimBuilder};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "city", about = "Software-defined traffic network simulation")]
struct Args {
    /// Scenario directory.  Overrides --grid.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Generated grid size as WIDTHxHEIGHT.
    #[arg(long, default_value = "5x5")]
    grid: String,

    /// Edge cost between neighbouring grid subnets.
    #[arg(long, default_value_t = 1.0)]
    cost: f64,

    /// Capacity of every grid subnet.
    #[arg(long, default_value_t = 3)]
    capacity: usize,

    /// Random vehicles to add (default 30 for a grid, 0 for a scenario).
    #[arg(long)]
    vehicles: Option<usize>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Vehicle polling interval.
    #[arg(long, default_value_t = 300)]
    poll_ms: u64,

    /// Maximum random extra delay per poll.
    #[arg(long, default_value_t = 50)]
    jitter_ms: u64,

    /// Dispatcher sleep between passes.
    #[arg(long, default_value_t = 10)]
    dispatch_ms: u64,

    /// Wall time per unit of edge cost.
    #[arg(long, default_value_t = 100)]
    cost_unit_ms: u64,

    /// Stop after this many seconds (0 = no limit).
    #[arg(long, default_value_t = 600)]
    max_secs: u64,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_grid(s: &str) -> Result<(usize, usize)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("grid must look like 5x5, got {s:?}"))?;
    let (w, h) = (w.trim().parse::<usize>()?, h.trim().parse::<usize>()?);
    if w == 0 || h == 0 {
        bail!("grid dimensions must be positive, got {s:?}");
    }
    Ok((w, h))
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.log_file.as_deref())?;

    let scenario = match &args.scenario {
        Some(dir) => {
            let s = load_scenario_dir(dir)
                .with_context(|| format!("loading scenario from {}", dir.display()))?;
            s.with_random_vehicles(args.vehicles.unwrap_or(0), args.seed)
        }
        None => {
            let (w, h) = parse_grid(&args.grid)?;
            log::info!("generating {w}x{h} grid, capacity {} per subnet", args.capacity);
            Scenario::grid(w, h, args.cost, args.capacity)
                .with_random_vehicles(args.vehicles.unwrap_or(30), args.seed)
        }
    };

    let config = SimConfig {
        seed:              args.seed,
        poll_interval:     Duration::from_millis(args.poll_ms),
        poll_jitter:       Duration::from_millis(args.jitter_ms),
        dispatch_interval: Duration::from_millis(args.dispatch_ms),
        cost_unit:         Duration::from_millis(args.cost_unit_ms),
        max_wall_time:     (args.max_secs > 0).then(|| Duration::from_secs(args.max_secs)),
    };

    let mut sim = SimBuilder::new(config, scenario).build()?;
    let report = sim.run(&LoggingObserver)?;

    // ── Summary ───────────────────────────────────────────────────────────
    let node = sim.node();
    println!(
        "{} rounds, {} dispatches, {} unroutable passes, {:.2?} wall time",
        report.rounds.0, report.dispatched, report.no_route, report.wall_time,
    );
    println!(
        "{}/{} vehicles arrived, mean trip {:.2?}",
        report.arrived().count(),
        report.trips.len(),
        report.mean_trip_time().unwrap_or_default(),
    );
    for trip in report.unfinished() {
        println!(
            "  {} stuck at {} heading for {} ({} blocked moves)",
            trip.vehicle,
            node.subnet_name(trip.position).unwrap_or_default(),
            node.subnet_name(trip.destination).unwrap_or_default(),
            trip.blocked,
        );
    }
    if report.timed_out {
        log::warn!("run hit the {}s limit", args.max_secs);
    }
    Ok(())
}
