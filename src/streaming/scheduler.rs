//! Chunk scheduler: keeps the chunks around the viewer generated.
//!
//! Per chunk: `Unloaded → Queued → Generating → Loaded → Unloaded`. A chunk
//! with no entry in `states` is unloaded. Work is sliced into ticks; each tick
//! generates a few chunks and applies a few boundary refreshes.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::core::types::{IVec3, Vec3};
use crate::core::{Error, Result};
use crate::dungeon::DungeonRegistry;
use crate::generation::{DungeonConfig, DungeonGenerator};
use crate::streaming::budget::TickBudget;
use crate::streaming::cache::{ChunkCache, ChunkRecord};
use crate::streaming::pool::ChunkPool;
use crate::streaming::priority::{GenerationJob, JobQueue, priority_for_distance};
use crate::voxel::chunk::{ChunkCoord, Face, world_to_local};

/// Lifecycle state of a chunk the scheduler knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Queued,
    Generating,
    Loaded,
}

/// What one tick did
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub generated: Vec<ChunkCoord>,
    pub refreshed: Vec<ChunkCoord>,
    /// Dequeued but too far from the viewer to be worth generating
    pub dropped: Vec<ChunkCoord>,
    pub failed: Vec<ChunkCoord>,
    /// Put back in the queue because no container was free
    pub deferred: Vec<ChunkCoord>,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.generated.is_empty()
            && self.refreshed.is_empty()
            && self.dropped.is_empty()
            && self.failed.is_empty()
            && self.deferred.is_empty()
    }
}

/// Cumulative counters since the scheduler was created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub generated: u64,
    pub refreshed: u64,
    pub dropped: u64,
    pub failed: u64,
    pub deferred: u64,
    pub unloaded: u64,
}

/// Drives chunk generation around a moving viewer
pub struct ChunkScheduler {
    config: DungeonConfig,
    generator: DungeonGenerator,
    registry: DungeonRegistry,
    queue: JobQueue,
    states: HashMap<ChunkCoord, ChunkState>,
    cache: ChunkCache,
    pool: ChunkPool,
    refresh_queue: VecDeque<ChunkCoord>,
    refresh_pending: HashSet<ChunkCoord>,
    viewer_chunk: Option<ChunkCoord>,
    stats: SchedulerStats,
}

impl ChunkScheduler {
    /// Create a scheduler for a world.
    ///
    /// # Errors
    /// `Error::Config` if the configuration is invalid.
    pub fn new(config: DungeonConfig) -> Result<Self> {
        config.validate()?;
        let dims = config.chunk_dims;
        let streaming = &config.streaming;

        log::info!(
            "Chunk scheduler: seed {}, chunk {}x{}x{}, render radius {}",
            config.seed,
            dims.x,
            dims.y,
            dims.z,
            streaming.render_radius
        );

        Ok(Self {
            generator: DungeonGenerator::new(&config),
            registry: DungeonRegistry::new(dims),
            queue: JobQueue::new(),
            states: HashMap::new(),
            cache: ChunkCache::new(),
            pool: ChunkPool::new(dims, streaming.pool_capacity, streaming.pool_overflow),
            refresh_queue: VecDeque::new(),
            refresh_pending: HashSet::new(),
            viewer_chunk: None,
            stats: SchedulerStats::default(),
            config,
        })
    }

    /// Track the viewer. Crossing into another chunk rebuilds the queue.
    pub fn update_viewer(&mut self, pos: Vec3) {
        let chunk = ChunkCoord::from_world_pos(pos, self.config.chunk_dims);
        if self.viewer_chunk != Some(chunk) {
            self.refresh(chunk);
        }
    }

    /// Re-center on `viewer_chunk`: unload chunks outside the render radius
    /// and queue every unloaded chunk inside it.
    pub fn refresh(&mut self, viewer_chunk: ChunkCoord) {
        self.viewer_chunk = Some(viewer_chunk);
        let radius = self.config.streaming.render_radius;

        for coord in self.cache.outside_radius(viewer_chunk, radius) {
            self.unload(coord);
        }

        self.queue.clear();
        self.states.retain(|_, s| *s != ChunkState::Queued);
        for coord in viewer_chunk.within_radius(radius) {
            if self.states.contains_key(&coord) {
                continue;
            }
            let priority = priority_for_distance(coord.chebyshev(viewer_chunk));
            self.enqueue(coord, priority);
        }

        log::debug!(
            "Viewer at {:?}: {} queued, {} loaded",
            viewer_chunk,
            self.queue.len(),
            self.cache.len()
        );
    }

    /// Queue `coord` for generation, replacing any queued job for it.
    /// Loaded or generating chunks are left alone.
    pub fn enqueue(&mut self, coord: ChunkCoord, priority: u32) {
        match self.states.get(&coord) {
            Some(ChunkState::Loaded) | Some(ChunkState::Generating) => return,
            Some(ChunkState::Queued) => {
                self.queue.remove(coord);
            }
            None => {}
        }
        self.queue.push(coord, priority);
        self.states.insert(coord, ChunkState::Queued);
    }

    /// Run one budgeted step of generation and boundary refreshes.
    pub fn tick(&mut self) -> TickReport {
        let streaming = &self.config.streaming;
        let mut budget = TickBudget::new(streaming.max_chunks_per_tick, streaming.max_refreshes_per_tick);
        let max_distance = streaming.render_radius + 1;
        let mut report = TickReport::default();

        while budget.try_generation() {
            let Some(job) = self.queue.pop() else { break };
            self.states.remove(&job.coord);

            if self.viewer_chunk.is_some_and(|v| job.coord.chebyshev(v) > max_distance) {
                report.dropped.push(job.coord);
                continue;
            }

            match self.generate(job) {
                Ok(()) => report.generated.push(job.coord),
                Err(Error::PoolExhausted { capacity }) => {
                    log::debug!("No free container ({} in use), deferring {:?}", capacity, job.coord);
                    self.queue.requeue(job);
                    self.states.insert(job.coord, ChunkState::Queued);
                    report.deferred.push(job.coord);
                    break;
                }
                Err(e) => {
                    log::warn!("Failed to generate chunk {:?}: {}", job.coord, e);
                    report.failed.push(job.coord);
                }
            }
        }

        while budget.try_refresh() {
            let Some(coord) = self.refresh_queue.pop_front() else { break };
            self.refresh_pending.remove(&coord);
            match self.rebuild(coord) {
                Ok(true) => report.refreshed.push(coord),
                Ok(false) => {}
                Err(e) => log::warn!("Failed to refresh chunk {:?}: {}", coord, e),
            }
        }

        self.stats.ticks += 1;
        self.stats.generated += report.generated.len() as u64;
        self.stats.refreshed += report.refreshed.len() as u64;
        self.stats.dropped += report.dropped.len() as u64;
        self.stats.failed += report.failed.len() as u64;
        self.stats.deferred += report.deferred.len() as u64;

        if !report.is_idle() {
            log::debug!(
                "Tick {}: {} generated, {} refreshed, {} dropped, {} queued",
                self.stats.ticks,
                report.generated.len(),
                report.refreshed.len(),
                report.dropped.len(),
                self.queue.len()
            );
        }
        report
    }

    fn generate(&mut self, job: GenerationJob) -> Result<()> {
        let coord = job.coord;
        self.states.insert(coord, ChunkState::Generating);

        let mut container = match self.pool.acquire() {
            Ok(c) => c,
            Err(e) => {
                self.states.remove(&coord);
                return Err(e);
            }
        };

        let outcome = match self.generator.generate(
            coord,
            &mut self.registry,
            &mut container.voxels,
            &mut container.light,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.pool.release(container);
                self.states.remove(&coord);
                return Err(e);
            }
        };

        self.cache.insert(ChunkRecord::new(coord, container, self.stats.ticks));
        self.states.insert(coord, ChunkState::Loaded);

        for neighbor in coord.face_neighbors().into_iter().chain(outcome.touched_chunks) {
            self.request_refresh(neighbor);
        }
        Ok(())
    }

    /// Re-carve and re-light a loaded chunk. Returns false if it is not loaded.
    fn rebuild(&mut self, coord: ChunkCoord) -> Result<bool> {
        let Some(record) = self.cache.get_mut(coord) else {
            return Ok(false);
        };
        let container = &mut record.container;
        self.generator.build(coord, &self.registry, &mut container.voxels, &mut container.light)?;
        record.mesh_dirty = true;
        record.updated_tick = self.stats.ticks;
        Ok(true)
    }

    fn request_refresh(&mut self, coord: ChunkCoord) {
        if self.cache.contains(coord) && self.refresh_pending.insert(coord) {
            self.refresh_queue.push_back(coord);
        }
    }

    fn unload(&mut self, coord: ChunkCoord) {
        if let Some(record) = self.cache.remove(coord) {
            self.pool.release(record.container);
            self.stats.unloaded += 1;
        }
        self.registry.prune(coord);
        self.states.remove(&coord);
        self.refresh_pending.remove(&coord);
        self.refresh_queue.retain(|&c| c != coord);
    }

    /// Whether the voxel one step across `face` from `local` in `coord` is
    /// solid. Unknown or not-yet-generated chunks answer solid.
    pub fn is_solid_in_adjacent_chunk(&self, coord: ChunkCoord, local: IVec3, face: Face) -> bool {
        let dims = self.config.chunk_dims;
        let world = coord.world_origin(dims) + local + face.normal();
        let (chunk, local) = world_to_local(world, dims);
        self.cache
            .get(chunk)
            .map_or(true, |record| record.voxels().get_or(local, true))
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.cache.get(coord)
    }

    /// Clear a chunk's mesh-dirty flag once the mesh emitter has consumed it.
    pub fn mark_meshed(&mut self, coord: ChunkCoord) {
        if let Some(record) = self.cache.get_mut(coord) {
            record.mesh_dirty = false;
        }
    }

    /// Loaded chunks whose mesh is stale, sorted.
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        let mut out: Vec<_> = self
            .cache
            .coords()
            .copied()
            .filter(|&c| self.cache.get(c).is_some_and(|r| r.mesh_dirty))
            .collect();
        out.sort();
        out
    }

    pub fn state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.states.get(&coord).copied()
    }

    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_refreshes(&self) -> usize {
        self.refresh_queue.len()
    }

    pub fn viewer_chunk(&self) -> Option<ChunkCoord> {
        self.viewer_chunk
    }

    pub fn registry(&self) -> &DungeonRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn pool(&self) -> &ChunkPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::chunk::ChunkDims;

    fn small_config() -> DungeonConfig {
        let mut config = DungeonConfig::with_seed(77);
        config.chunk_dims = ChunkDims::cube(16);
        config.streaming.render_radius = 1;
        config.streaming.max_chunks_per_tick = 4;
        config
    }

    fn drain(scheduler: &mut ChunkScheduler) {
        for _ in 0..500 {
            if scheduler.tick().is_idle() {
                return;
            }
        }
        panic!("scheduler did not settle");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.rooms.min_room_size = 20;
        config.rooms.max_room_size = 10;
        assert!(matches!(ChunkScheduler::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_enqueue_order_priority_then_fifo() {
        let mut scheduler = ChunkScheduler::new(small_config()).unwrap();
        let coords = [
            ChunkCoord::new(2, 0, 0),
            ChunkCoord::new(0, 0, 0),
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(0, 0, 1),
        ];
        for (coord, priority) in coords.iter().zip([2, 0, 1, 0]) {
            scheduler.enqueue(*coord, priority);
        }

        // No viewer yet: nothing is cancelled
        let report = scheduler.tick();
        assert_eq!(report.generated, vec![coords[1], coords[3], coords[2], coords[0]]);
        for c in coords {
            assert_eq!(scheduler.state(c), Some(ChunkState::Loaded));
        }
    }

    #[test]
    fn test_viewer_fills_render_radius() {
        let mut scheduler = ChunkScheduler::new(small_config()).unwrap();
        scheduler.update_viewer(Vec3::new(8.0, 8.0, 8.0));
        assert_eq!(scheduler.queued_count(), 27);

        // Nearest chunk goes first
        let first = scheduler.tick();
        assert_eq!(first.generated[0], ChunkCoord::new(0, 0, 0));
        assert_eq!(first.generated.len(), 4);

        drain(&mut scheduler);
        assert_eq!(scheduler.loaded_count(), 27);
        assert_eq!(scheduler.queued_count(), 0);
        assert_eq!(scheduler.stats().generated, 27);
    }

    #[test]
    fn test_moving_viewer_unloads_and_prunes() {
        let mut scheduler = ChunkScheduler::new(small_config()).unwrap();
        scheduler.update_viewer(Vec3::new(8.0, 8.0, 8.0));
        drain(&mut scheduler);

        // Two chunks along +X: only the x = 1 slab stays in range
        scheduler.update_viewer(Vec3::new(40.0, 8.0, 8.0));
        assert!(scheduler.chunk(ChunkCoord::new(0, 0, 0)).is_none());
        assert!(scheduler.chunk(ChunkCoord::new(1, 0, 0)).is_some());
        assert_eq!(scheduler.stats().unloaded, 9 * 2);
        assert_eq!(scheduler.queued_count(), 9 * 2);
        assert!(!scheduler.registry().is_indexed(ChunkCoord::new(0, 0, 0)));

        drain(&mut scheduler);
        assert_eq!(scheduler.loaded_count(), 27);
    }

    #[test]
    fn test_stale_jobs_dropped() {
        let mut config = small_config();
        config.streaming.max_chunks_per_tick = 1;
        let mut scheduler = ChunkScheduler::new(config).unwrap();
        scheduler.refresh(ChunkCoord::new(0, 0, 0));

        let far = ChunkCoord::new(9, 0, 0);
        scheduler.enqueue(far, 0);
        let report = scheduler.tick();
        assert_eq!(report.dropped.len() + report.generated.len(), 1);
        // Priority 0 ties go FIFO: the center chunk was queued first
        assert_eq!(report.generated, vec![ChunkCoord::new(0, 0, 0)]);

        let report = scheduler.tick();
        assert_eq!(report.dropped, vec![far]);
        assert_eq!(scheduler.state(far), None);
    }

    #[test]
    fn test_pool_exhaustion_defers() {
        let mut config = small_config();
        config.streaming.pool_capacity = 2;
        config.streaming.pool_overflow = false;
        let mut scheduler = ChunkScheduler::new(config).unwrap();
        scheduler.refresh(ChunkCoord::new(0, 0, 0));

        let report = scheduler.tick();
        assert_eq!(report.generated.len(), 2);
        assert_eq!(report.deferred.len(), 1);
        assert_eq!(scheduler.state(report.deferred[0]), Some(ChunkState::Queued));
        assert_eq!(scheduler.queued_count(), 25);
    }

    #[test]
    fn test_neighbors_refreshed_after_generation() {
        let mut config = small_config();
        config.streaming.max_chunks_per_tick = 1;
        let mut scheduler = ChunkScheduler::new(config).unwrap();
        let a = ChunkCoord::new(0, 0, 0);
        let b = ChunkCoord::new(1, 0, 0);
        scheduler.enqueue(a, 0);
        scheduler.enqueue(b, 1);

        scheduler.tick();
        scheduler.mark_meshed(a);
        assert!(scheduler.dirty_chunks().is_empty());

        let report = scheduler.tick();
        assert_eq!(report.generated, vec![b]);
        assert!(report.refreshed.contains(&a));
        assert!(scheduler.dirty_chunks().contains(&a));
    }

    #[test]
    fn test_adjacent_solidity_query() {
        let mut scheduler = ChunkScheduler::new(small_config()).unwrap();
        let a = ChunkCoord::new(0, 0, 0);
        let edge = IVec3::new(15, 3, 3);

        // Neighbor unknown: solid
        assert!(scheduler.is_solid_in_adjacent_chunk(a, edge, Face::PosX));

        scheduler.enqueue(a, 0);
        scheduler.enqueue(ChunkCoord::new(1, 0, 0), 0);
        scheduler.tick();

        let neighbor = scheduler.chunk(ChunkCoord::new(1, 0, 0)).unwrap();
        let expected = neighbor.voxels().is_solid(IVec3::new(0, 3, 3));
        assert_eq!(scheduler.is_solid_in_adjacent_chunk(a, edge, Face::PosX), expected);

        // Interior step stays in the same chunk
        let own = scheduler.chunk(a).unwrap().voxels().is_solid(IVec3::new(5, 3, 3));
        assert_eq!(scheduler.is_solid_in_adjacent_chunk(a, IVec3::new(4, 3, 3), Face::PosX), own);
    }

    #[test]
    fn test_reload_matches_first_load() {
        let mut scheduler = ChunkScheduler::new(small_config()).unwrap();
        scheduler.update_viewer(Vec3::new(8.0, 8.0, 8.0));
        drain(&mut scheduler);
        let origin = ChunkCoord::new(0, 0, 0);
        let before = scheduler.chunk(origin).unwrap().voxels().clone();

        scheduler.update_viewer(Vec3::new(8.0 + 16.0 * 8.0, 8.0, 8.0));
        drain(&mut scheduler);
        scheduler.update_viewer(Vec3::new(8.0, 8.0, 8.0));
        drain(&mut scheduler);

        let after = scheduler.chunk(origin).unwrap().voxels();
        assert_eq!(after.as_slice(), before.as_slice());
    }
}
