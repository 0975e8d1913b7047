//! Voxel data structures: chunk lattice and dense per-chunk grids

pub mod chunk;
pub mod grid;

pub use chunk::{ChunkCoord, ChunkDims, Face, world_to_local};
pub use grid::{Grid3, LightField, VoxelField};
