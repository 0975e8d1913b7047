//! Cache of loaded chunks
//!
//! Holds the runtime record of every loaded chunk. Residency is decided by
//! the scheduler (distance to the viewer), not by the cache itself.

use std::collections::HashMap;

use crate::streaming::pool::ChunkContainer;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::grid::{LightField, VoxelField};

/// A loaded chunk: carved voxels and light in a pooled container.
pub struct ChunkRecord {
    pub coord: ChunkCoord,
    pub container: ChunkContainer,
    /// Set when the fields changed since the mesh emitter last looked.
    pub mesh_dirty: bool,
    /// Tick on which the chunk was last generated or refreshed
    pub updated_tick: u64,
}

impl ChunkRecord {
    pub fn new(coord: ChunkCoord, container: ChunkContainer, tick: u64) -> Self {
        Self { coord, container, mesh_dirty: true, updated_tick: tick }
    }

    pub fn voxels(&self) -> &VoxelField {
        &self.container.voxels
    }

    pub fn light(&self) -> &LightField {
        &self.container.light
    }
}

/// Loaded chunks keyed by coordinate
#[derive(Default)]
pub struct ChunkCache {
    chunks: HashMap<ChunkCoord, ChunkRecord>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.chunks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkRecord> {
        self.chunks.get_mut(&coord)
    }

    /// Insert a record, returning the one it replaced
    pub fn insert(&mut self, record: ChunkRecord) -> Option<ChunkRecord> {
        self.chunks.insert(record.coord, record)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ChunkRecord> {
        self.chunks.remove(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Loaded chunks farther than `radius` (Chebyshev) from `center`
    pub fn outside_radius(&self, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
        let mut out: Vec<_> = self
            .chunks
            .keys()
            .copied()
            .filter(|c| c.chebyshev(center) > radius)
            .collect();
        out.sort();
        out
    }
}
