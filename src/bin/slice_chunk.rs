//! Prints an ASCII Y-slice of one generated chunk.
//!
//! Usage: cargo run --bin slice_chunk -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>     World seed (default: 12345)
//!   --chunk <X,Y,Z>   Chunk coordinate (default: 0,0,0)
//!   --y <Y>           Local slice height (default: middle of the chunk)
//!   --size <N>        Cubic chunk size (default: config default)
//!   --light           Print light intensity instead of solidity
//!
//! Generates the 3x3x3 block around the chunk first so corridors from its
//! neighbors are present.

use delve::core::logging;
use delve::dungeon::DungeonRegistry;
use delve::generation::{DungeonConfig, DungeonGenerator};
use delve::core::IVec3;
use delve::voxel::{ChunkCoord, ChunkDims, LightField, VoxelField};

const SHADES: &[u8] = b" .:-=+*#%@";

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = DungeonConfig::with_seed(parse_arg(&args, "--seed").unwrap_or(12345));
    if let Some(size) = parse_arg::<u32>(&args, "--size") {
        config.chunk_dims = ChunkDims::cube(size);
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let coord = parse_str(&args, "--chunk")
        .and_then(|s| parse_coord(&s))
        .unwrap_or(ChunkCoord::new(0, 0, 0));
    let dims = config.chunk_dims;
    let y = parse_arg::<i32>(&args, "--y").unwrap_or(dims.y as i32 / 2);
    let show_light = args.iter().any(|a| a == "--light");

    let generator = DungeonGenerator::new(&config);
    let mut registry = DungeonRegistry::new(dims);
    let mut voxels = VoxelField::empty(dims);
    let mut light = LightField::dark(dims);

    for neighbor in coord.within_radius(1) {
        if let Err(e) = generator.generate(neighbor, &mut registry, &mut voxels, &mut light) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
    if let Err(e) = generator.build(coord, &registry, &mut voxels, &mut light) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    println!(
        "chunk {:?} y={} ({} rooms, {} corridors in registry)",
        coord,
        y,
        registry.rooms_touching(coord).len(),
        registry.corridors_touching(coord).len()
    );
    for z in 0..dims.z as i32 {
        let row: String = (0..dims.x as i32)
            .map(|x| {
                let p = IVec3::new(x, y, z);
                if show_light {
                    let v = light.get_or(p, 0.0) / config.lighting.source_intensity;
                    let i = ((v * (SHADES.len() - 1) as f32).round() as usize).min(SHADES.len() - 1);
                    SHADES[i] as char
                } else if voxels.is_solid(p) {
                    '#'
                } else {
                    '.'
                }
            })
            .collect();
        println!("{}", row);
    }
}

fn parse_coord(s: &str) -> Option<ChunkCoord> {
    let parts: Vec<i32> = s.split(',').map(|p| p.trim().parse().ok()).collect::<Option<_>>()?;
    match parts.as_slice() {
        [x, y, z] => Some(ChunkCoord::new(*x, *y, *z)),
        _ => None,
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
