//! Shard Redundancy Simulator CLI
//!
//! Runs the redundancy simulation either on a virtual clock (fast and
//! reproducible with `--seed`) or in real time on the tokio runtime.
//!
//! # Example
//!
//! ```bash
//! # 100 ticks, 6+4 layout on 12 nodes, fixed seed
//! redundancy-sim -k 6 -m 4 -n 12 --seed 42 --ticks 100
//!
//! # Watch it live for 30 seconds with a harsher failure rate
//! redundancy-sim --failure-rate 40 --realtime 30
//! ```

use clap::Parser;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use redundancy_sim_lib::{
    RedundancyConfig, RedundancySimulator, SimulationController, SimulationRunner,
    SimulationSnapshot, SimulationTiming, StoragePlan,
};

/// Shard Redundancy Simulator
///
/// Simulates node failures, self-repair and integrity challenges for an
/// erasure-coded file.
#[derive(Parser, Debug)]
#[command(name = "redundancy-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of data shards (k)
    #[arg(short = 'k', long, default_value = "6")]
    data_shards: usize,

    /// Number of parity shards (m)
    #[arg(short = 'm', long, default_value = "4")]
    parity_shards: usize,

    /// Number of storage nodes
    #[arg(short = 'n', long, default_value = "12")]
    nodes: usize,

    /// Failure rate in percent (scaled by 0.1 per tick)
    #[arg(long, default_value = "5")]
    failure_rate: f64,

    /// Health percentage below which self-repair starts
    #[arg(long, default_value = "80")]
    repair_threshold: f64,

    /// Issue an integrity challenge every this many ticks
    #[arg(long, default_value = "5")]
    challenge_frequency: u64,

    /// Verify challenges with a direct check instead of TSS
    #[arg(long)]
    direct_checks: bool,

    /// Do not anchor challenge proofs
    #[arg(long)]
    no_anchoring: bool,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run on the virtual clock
    #[arg(short = 't', long, default_value = "50")]
    ticks: u64,

    /// Run in real time for this many seconds instead of on the virtual clock
    #[arg(long)]
    realtime: Option<u64>,

    /// Tick period in milliseconds
    #[arg(long, default_value = "2000")]
    tick_ms: u64,

    /// Repair delay in milliseconds
    #[arg(long, default_value = "1500")]
    repair_ms: u64,

    /// Print a storage plan for a file of this many bytes
    #[arg(long)]
    file_size: Option<u64>,

    /// Print snapshots as JSON instead of a summary line
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = RedundancyConfig::default()
        .with_layout(args.data_shards, args.parity_shards)
        .with_total_nodes(args.nodes)
        .with_failure_rate(args.failure_rate)
        .with_repair_threshold(args.repair_threshold)
        .with_challenge_frequency(args.challenge_frequency)
        .with_integrity_checks(!args.direct_checks)
        .with_anchoring(!args.no_anchoring);

    let timing = SimulationTiming {
        tick_period: Duration::from_millis(args.tick_ms),
        repair_delay: Duration::from_millis(args.repair_ms),
    };

    let seed = args.seed.unwrap_or_else(rand::random);

    let sim = match RedundancySimulator::with_seed(config.clone(), seed) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = timing.validate() {
        error!("Invalid timing: {}", e);
        std::process::exit(2);
    }

    info!(
        k = args.data_shards,
        m = args.parity_shards,
        nodes = args.nodes,
        seed,
        "Starting redundancy simulation"
    );

    if let Some(file_size) = args.file_size {
        let plan = StoragePlan::compute(file_size, config.layout, config.total_nodes);
        print_plan(&plan, args.json);
    }

    match args.realtime {
        Some(secs) => run_realtime(sim, timing, Duration::from_secs(secs), args.json).await,
        None => run_virtual(sim, timing, args.ticks, args.json),
    }
}

fn run_virtual(sim: RedundancySimulator, timing: SimulationTiming, ticks: u64, json: bool) {
    let mut runner = match SimulationRunner::new(sim, timing) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Invalid timing: {}", e);
            return;
        }
    };

    for _ in 0..ticks {
        if runner.run_ticks(1).is_empty() {
            break;
        }
        print_snapshot(&runner.simulator().snapshot(), json);
    }

    // Let repairs started on the last tick land
    runner.pause();
    runner.run_for(timing.repair_delay);

    let stats = runner.simulator().stats();
    info!(
        elapsed = ?runner.now(),
        failures = stats.failures,
        repairs_started = stats.repairs_started,
        repairs_completed = stats.repairs_completed,
        anchored_events = stats.anchored_events,
        recoverable = runner.simulator().is_recoverable(),
        "Simulation finished"
    );
}

async fn run_realtime(sim: RedundancySimulator, timing: SimulationTiming, duration: Duration, json: bool) {
    let mut controller = match SimulationController::new(sim, timing) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Invalid timing: {}", e);
            return;
        }
    };
    controller.start().await;

    let deadline = tokio::time::Instant::now() + duration;
    let mut last_tick = None;
    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshot = controller.snapshot().await;
        if last_tick != Some(snapshot.tick) {
            last_tick = Some(snapshot.tick);
            print_snapshot(&snapshot, json);
        }
    }

    controller.pause().await;
    let snapshot = controller.snapshot().await;
    info!(
        ticks = snapshot.tick,
        recoverable = snapshot.recovery.is_recoverable,
        "Simulation finished"
    );
}

fn print_snapshot(snapshot: &SimulationSnapshot, json: bool) {
    if json {
        match snapshot.to_json() {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to encode snapshot: {}", e),
        }
        return;
    }

    match &snapshot.last_message {
        Some(message) => println!("{} | {}", snapshot.summary(), message),
        None => println!("{}", snapshot.summary()),
    }
}

fn print_plan(plan: &StoragePlan, json: bool) {
    if json {
        match serde_json::to_string(plan) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to encode storage plan: {}", e),
        }
        return;
    }

    println!("\n=== Storage Plan ===");
    println!("File size:          {} bytes", plan.file_size_bytes);
    println!("Shard size:         {} bytes", plan.shard_size_bytes);
    println!("Total stored:       {} bytes ({:.2}x)", plan.total_stored_bytes, plan.overhead_ratio);
    println!("Efficiency:         {:.1}%", plan.efficiency_percent);
    println!("Shard tolerance:    {}", plan.fault_tolerance_shards);
    println!("Nodes used:         {}", plan.nodes_used);
    println!("Max shards/node:    {} ({} bytes)", plan.max_shards_per_node, plan.max_bytes_per_node);
    println!("Node loss tolerated: {}\n", plan.node_loss_tolerance);
}
