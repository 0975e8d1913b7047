//! Generation configuration bundle.
//!
//! Everything the core needs besides the viewer position lives here. The
//! bundle round-trips through JSON so worlds can be reproduced from a file;
//! missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::voxel::chunk::ChunkDims;

/// Terrain classification parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// World-to-noise frequency (smaller = larger features).
    pub noise_scale: f64,
    /// Constant added to every noise coordinate so the sampled tile stays
    /// away from the lattice origin.
    pub noise_offset: f64,
    /// Fractal octaves of the density noise.
    pub octaves: usize,
    /// Density above this value is solid.
    pub fill_threshold: f32,
    /// Fractional chunk height where the vertical bias peaks (0 = floor, 1 = top).
    pub bias_peak: f32,
    /// How fast density falls off away from the peak.
    pub bias_strength: f32,
    /// Lattice spacing of density samples, in voxels.
    pub sample_stride: u32,
    /// Cellular-automaton passes after the initial sweep.
    pub smoothing_iterations: u32,
    /// Classify a halo around the chunk so neighbors agree at shared faces.
    pub boundary_halo: bool,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            noise_scale: 0.06,
            noise_offset: 10_000.0,
            octaves: 2,
            fill_threshold: 0.45,
            bias_peak: 0.5,
            bias_strength: 0.6,
            sample_stride: 2,
            smoothing_iterations: 2,
            boundary_halo: true,
        }
    }
}

/// Room extraction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomParams {
    /// Minimum room edge length in voxels.
    pub min_room_size: u32,
    /// Maximum room edge length in voxels.
    pub max_room_size: u32,
    /// Lattice spacing of candidate anchor cells.
    pub scan_stride: u32,
    /// Random cells probed inside the minimum cube before measuring extents.
    pub probe_samples: u32,
    /// Random room sizes tried per anchor.
    pub fit_trials: u32,
    /// Cells sampled when validating a sized cuboid. A value at least as large
    /// as the cuboid volume makes the check exhaustive.
    pub fit_samples: u32,
    /// Cells reserved around each extracted room.
    pub padding: u32,
}

impl Default for RoomParams {
    fn default() -> Self {
        Self {
            min_room_size: 4,
            max_room_size: 12,
            scan_stride: 2,
            probe_samples: 6,
            fit_trials: 10,
            fit_samples: 48,
            padding: 1,
        }
    }
}

/// Corridor connection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorParams {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    /// Extra loop edges per connect = `max(1, new rooms / extra_edge_divisor)`.
    pub extra_edge_divisor: u32,
    /// Chebyshev radius (in chunks) of the area connected around a new chunk.
    pub neighborhood_radius: i32,
}

impl Default for CorridorParams {
    fn default() -> Self {
        Self {
            min_width: 1,
            max_width: 3,
            min_height: 2,
            max_height: 3,
            extra_edge_divisor: 4,
            neighborhood_radius: 1,
        }
    }
}

/// Light propagation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightParams {
    /// Intensity of a light source voxel; upper bound of every light value.
    pub source_intensity: f32,
    /// Intensity lost per voxel step.
    pub decay: f32,
    /// Synchronous diffusion rounds.
    pub propagation_steps: u32,
    /// Probability that a source candidate becomes a light.
    pub source_chance: f32,
    /// Fraction of the brightest adjacent air a solid voxel receives.
    pub solid_factor: f32,
    /// Run the same-type box blur after propagation.
    pub smoothing: bool,
    /// Weight of the blurred value when smoothing.
    pub smoothing_blend: f32,
    /// Split diffusion rounds across the rayon pool.
    pub parallel: bool,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            source_intensity: 1.0,
            decay: 0.08,
            propagation_steps: 12,
            source_chance: 0.015,
            solid_factor: 0.7,
            smoothing: true,
            smoothing_blend: 0.7,
            parallel: true,
        }
    }
}

/// Chunk streaming parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingParams {
    /// Chebyshev radius (in chunks) kept loaded around the viewer.
    pub render_radius: i32,
    /// Chunks generated per tick.
    pub max_chunks_per_tick: u32,
    /// Boundary refreshes applied per tick.
    pub max_refreshes_per_tick: u32,
    /// Containers the pool keeps for reuse.
    pub pool_capacity: usize,
    /// Allocate past `pool_capacity` instead of deferring jobs.
    pub pool_overflow: bool,
}

impl Default for StreamingParams {
    fn default() -> Self {
        Self {
            render_radius: 2,
            max_chunks_per_tick: 2,
            max_refreshes_per_tick: 4,
            pool_capacity: 125,
            pool_overflow: true,
        }
    }
}

/// Full configuration for a dungeon world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// World seed; rooms, corridors and lights derive from it.
    pub seed: u64,
    /// Voxels per chunk along each axis.
    pub chunk_dims: ChunkDims,
    pub terrain: TerrainParams,
    pub rooms: RoomParams,
    pub corridors: CorridorParams,
    pub lighting: LightParams,
    pub streaming: StreamingParams,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            chunk_dims: ChunkDims::default(),
            terrain: TerrainParams::default(),
            rooms: RoomParams::default(),
            corridors: CorridorParams::default(),
            lighting: LightParams::default(),
            streaming: StreamingParams::default(),
        }
    }
}

impl DungeonConfig {
    /// Default configuration with a different seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Default::default() }
    }

    /// Check every parameter is usable; the first problem found is reported.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: &str) -> Result<()> {
            if ok { Ok(()) } else { Err(Error::Config(msg.to_string())) }
        }

        let d = self.chunk_dims;
        check(d.x > 0 && d.y > 0 && d.z > 0, "chunk_dims must be non-zero on every axis")?;

        let t = &self.terrain;
        check(t.sample_stride >= 1, "terrain.sample_stride must be at least 1")?;
        check(t.octaves >= 1, "terrain.octaves must be at least 1")?;
        check((0.0..=1.0).contains(&t.fill_threshold), "terrain.fill_threshold must be in [0, 1]")?;
        check(t.noise_scale > 0.0, "terrain.noise_scale must be positive")?;

        let r = &self.rooms;
        check(r.min_room_size >= 1, "rooms.min_room_size must be at least 1")?;
        check(r.min_room_size <= r.max_room_size, "rooms.min_room_size exceeds rooms.max_room_size")?;
        check(r.scan_stride >= 1, "rooms.scan_stride must be at least 1")?;

        let c = &self.corridors;
        check(c.min_width >= 1 && c.min_width <= c.max_width, "corridors width bounds are invalid")?;
        check(c.min_height >= 1 && c.min_height <= c.max_height, "corridors height bounds are invalid")?;
        check(c.extra_edge_divisor >= 1, "corridors.extra_edge_divisor must be at least 1")?;
        check(c.neighborhood_radius >= 0, "corridors.neighborhood_radius must not be negative")?;

        let l = &self.lighting;
        check(l.source_intensity > 0.0, "lighting.source_intensity must be positive")?;
        check(l.decay >= 0.0, "lighting.decay must not be negative")?;
        check((0.0..=1.0).contains(&l.solid_factor), "lighting.solid_factor must be in [0, 1]")?;
        check((0.0..=1.0).contains(&l.smoothing_blend), "lighting.smoothing_blend must be in [0, 1]")?;

        let s = &self.streaming;
        check(s.render_radius >= 0, "streaming.render_radius must not be negative")?;
        check(s.max_chunks_per_tick >= 1, "streaming.max_chunks_per_tick must be at least 1")?;
        check(
            s.pool_capacity > 0 || s.pool_overflow,
            "streaming.pool_capacity is zero and overflow is disabled; no chunk container can be produced",
        )?;
        Ok(())
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file (sync) and validate
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded dungeon config from {} (seed {})", path.display(), config.seed);
        Ok(config)
    }
}
