//! Reusable chunk containers
//!
//! Containers hold the voxel and light buffers of one loaded chunk. Unloading
//! returns them here instead of freeing, so streaming settles into a steady
//! state with no per-chunk allocation.

use crate::core::{Error, Result};
use crate::voxel::chunk::ChunkDims;
use crate::voxel::grid::{LightField, VoxelField};

/// Buffers for one loaded chunk.
pub struct ChunkContainer {
    pub voxels: VoxelField,
    pub light: LightField,
}

impl ChunkContainer {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            voxels: VoxelField::empty(dims),
            light: LightField::dark(dims),
        }
    }

    fn clear(&mut self) {
        self.voxels.fill(false);
        self.light.fill(0.0);
    }
}

/// Pool of chunk containers.
///
/// Up to `capacity` containers are created on demand and recycled. Past
/// that, `overflow` decides between allocating extras and refusing.
pub struct ChunkPool {
    dims: ChunkDims,
    free: Vec<ChunkContainer>,
    capacity: usize,
    overflow: bool,
    /// Containers created so far (pooled and overflow)
    created: usize,
    /// Containers currently handed out
    in_use: usize,
}

impl ChunkPool {
    pub fn new(dims: ChunkDims, capacity: usize, overflow: bool) -> Self {
        Self {
            dims,
            free: Vec::with_capacity(capacity),
            capacity,
            overflow,
            created: 0,
            in_use: 0,
        }
    }

    /// Take a cleared container.
    ///
    /// # Errors
    /// `Error::PoolExhausted` when every pooled container is in use and
    /// overflow is disabled.
    pub fn acquire(&mut self) -> Result<ChunkContainer> {
        let container = match self.free.pop() {
            Some(c) => c,
            None if self.created < self.capacity || self.overflow => {
                if self.created >= self.capacity {
                    log::debug!("Chunk pool overflow: allocating container {}", self.created + 1);
                }
                self.created += 1;
                ChunkContainer::new(self.dims)
            }
            None => return Err(Error::PoolExhausted { capacity: self.capacity }),
        };
        self.in_use += 1;
        Ok(container)
    }

    /// Return a container. Overflow containers beyond capacity are dropped.
    pub fn release(&mut self, mut container: ChunkContainer) {
        self.in_use = self.in_use.saturating_sub(1);
        if self.free.len() + self.in_use >= self.capacity {
            self.created = self.created.saturating_sub(1);
            return;
        }
        container.clear();
        self.free.push(container);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;

    const DIMS: ChunkDims = ChunkDims::cube(4);

    #[test]
    fn test_acquire_release_reuses() {
        let mut pool = ChunkPool::new(DIMS, 2, false);
        let mut a = pool.acquire().unwrap();
        a.voxels.set(IVec3::ONE, true);
        a.light.set(IVec3::ONE, 0.5);
        assert_eq!(pool.in_use(), 1);

        pool.release(a);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.free_count(), 1);

        let b = pool.acquire().unwrap();
        assert_eq!(b.voxels.solid_count(), 0);
        assert_eq!(b.light.max_value(), 0.0);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_exhaustion_without_overflow() {
        let mut pool = ChunkPool::new(DIMS, 1, false);
        let a = pool.acquire().unwrap();
        assert!(matches!(pool.acquire(), Err(Error::PoolExhausted { capacity: 1 })));
        pool.release(a);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn test_overflow_allocates_and_drops_extras() {
        let mut pool = ChunkPool::new(DIMS, 1, true);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.in_use(), 2);

        pool.release(a);
        pool.release(b);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.free_count(), 1);
    }
}
