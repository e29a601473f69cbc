//! Headless driver: runs a simulation for a fixed number of frames and logs
//! flow statistics.
//!
//! Usage: `sphere-flow [config.json] [frames]`
//!
//! Set `RUST_LOG=debug` for per-frame statistics.

use sphere_flow::{Simulation, SimulationConfig};
use std::process::ExitCode;

const DELTA_TIME: f32 = 0.5;
const DEFAULT_FRAMES: u64 = 600;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SimulationConfig::load(&path)?,
        None => SimulationConfig::default(),
    };
    let frames: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut sim = Simulation::new(config)?;
    sim.init()?;

    log::info!(
        "running {} particles for {} frames (radius {})",
        sim.len(),
        frames,
        sim.sphere_radius()
    );

    let mut total_recycled = 0;
    for step in 0..frames {
        let stats = sim.update(DELTA_TIME, step);
        total_recycled += stats.recycled;
        log::debug!(
            "frame {:>5}: mean speed {:.5}, recycled {}",
            step,
            stats.mean_speed,
            stats.recycled
        );
    }

    let max_drift = sim
        .positions()
        .map(|p| (p.length() - sim.sphere_radius()).abs())
        .fold(0.0f32, f32::max);

    log::info!(
        "done: mean speed {:.5}, {} recycles, max radial drift {:.2e}",
        sim.last_stats().mean_speed,
        total_recycled,
        max_drift
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
