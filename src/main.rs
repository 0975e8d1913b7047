//! Delve headless walker: streams a dungeon along a straight line and
//! prints a JSON summary.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Load a DungeonConfig JSON file (default: built-in)
//!   --seed <SEED>     Override the world seed
//!   --ticks <N>       Scheduler ticks to run (default: 200)
//!   --speed <V>       Viewer speed along +X in voxels per tick (default: 2.0)
//!   --save-config <PATH>  Write the effective config and exit

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;

use delve::core::{Result, Vec3, logging};
use delve::generation::DungeonConfig;
use delve::streaming::ChunkScheduler;

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => DungeonConfig::load_sync(&PathBuf::from(path))?,
        None => DungeonConfig::default(),
    };
    if let Some(seed) = parse_u64_arg(&args, "--seed") {
        config.seed = seed;
    }
    let ticks = parse_u64_arg(&args, "--ticks").unwrap_or(200);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(2.0);

    if let Some(path) = parse_str_arg(&args, "--save-config") {
        config.validate()?;
        config.save_sync(&PathBuf::from(&path))?;
        log::info!("Wrote config to {}", path);
        return Ok(());
    }

    let dims = config.chunk_dims;
    let start = Vec3::new(dims.x as f32 * 0.5, dims.y as f32 * 0.5, dims.z as f32 * 0.5);
    let mut scheduler = ChunkScheduler::new(config)?;

    let timer = Instant::now();
    let mut viewer = start;
    let mut peak_loaded = 0;
    for _ in 0..ticks {
        scheduler.update_viewer(viewer);
        scheduler.tick();
        for coord in scheduler.dirty_chunks() {
            scheduler.mark_meshed(coord);
        }
        peak_loaded = peak_loaded.max(scheduler.loaded_count());
        viewer.x += speed;
    }
    let elapsed = timer.elapsed();

    let registry = scheduler.registry();
    let summary = json!({
        "seed": scheduler.config().seed,
        "ticks": ticks,
        "elapsed_ms": elapsed.as_millis() as u64,
        "viewer_end": [viewer.x, viewer.y, viewer.z],
        "viewer_chunk": scheduler.viewer_chunk(),
        "loaded_chunks": scheduler.loaded_count(),
        "peak_loaded_chunks": peak_loaded,
        "queued_chunks": scheduler.queued_count(),
        "rooms": registry.room_count(),
        "corridors": registry.corridor_count(),
        "room_links": registry.links().edge_count(),
        "pool_in_use": scheduler.pool().in_use(),
        "stats": scheduler.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
