//! Light source placement
//!
//! A voxel is a candidate when the cell above it is solid (a ceiling) and a
//! solid floor exists somewhere below it in the same column. Candidates become
//! lights through a hash of (world seed, chunk, local position), so a chunk
//! always gets the same lights however often it is regenerated.

use crate::core::types::IVec3;
use crate::math::{hash_cell, mix_seed};
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::grid::VoxelField;

const LIGHT_SALT: u64 = 0x4C49_4748_54;

/// Ceiling above and floor somewhere below.
pub fn is_candidate(field: &VoxelField, p: IVec3) -> bool {
    if !field.get_or(p + IVec3::Y, false) {
        return false;
    }
    (0..p.y).rev().any(|y| field.is_solid(IVec3::new(p.x, y, p.z)))
}

/// Deterministic per-position roll against `chance`.
pub fn roll(seed: u64, coord: ChunkCoord, local: IVec3, chance: f32) -> bool {
    let chunk_seed = hash_cell(mix_seed(seed, LIGHT_SALT), coord.as_ivec3());
    let h = hash_cell(chunk_seed, local);
    // Top 24 bits as a unit float
    let unit = (h >> 40) as f32 / (1u64 << 24) as f32;
    unit < chance
}

/// Local positions of every light source in `field`, in index order.
pub fn find_sources(field: &VoxelField, seed: u64, coord: ChunkCoord, chance: f32) -> Vec<IVec3> {
    field
        .iter()
        .map(|(p, _)| p)
        .filter(|&p| is_candidate(field, p) && roll(seed, coord, p, chance))
        .collect()
}
