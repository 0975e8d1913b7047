//! Dungeon generation pipeline: terrain → rooms → corridors → carved field → light.
//!
//! Generation of a chunk is split in two phases:
//! 1. Layout (`layout`): classify and extract rooms the first time a chunk is
//!    seen, then connect any newly registered rooms in the neighborhood. This
//!    mutates the registry.
//! 2. Build (`build`): carve every room and corridor indexed at the chunk into
//!    a fresh field and light it. This only reads the registry, so it can be
//!    repeated at will (boundary refreshes, reloads).

pub mod config;
pub mod terrain_gen;
pub mod room_gen;
pub mod corridor_gen;
pub mod carve;

pub use config::DungeonConfig;
pub use terrain_gen::TerrainClassifier;
pub use room_gen::RoomExtractor;
pub use corridor_gen::CorridorConnector;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::{Error, Result};
use crate::dungeon::{CorridorId, DungeonRegistry, RoomId};
use crate::lighting::LightPropagator;
use crate::math::{GridAabb, hash_cell, mix_seed};
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::grid::{LightField, VoxelField};

const CORRIDOR_SALT: u64 = 0x434F_5252;

/// Reproducible RNG for one (world seed, chunk, purpose) triple.
pub fn chunk_rng(seed: u64, coord: ChunkCoord, salt: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_cell(mix_seed(seed, salt), coord.as_ivec3()))
}

/// Registry changes made while laying out one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutOutcome {
    /// Terrain was classified and rooms extracted (first visit only).
    pub extracted: bool,
    pub rooms_added: Vec<RoomId>,
    pub corridors_added: Vec<CorridorId>,
    /// Other chunks the new corridors pass through, sorted.
    pub touched_chunks: Vec<ChunkCoord>,
}

/// Owns every generation stage for one world.
pub struct DungeonGenerator {
    config: DungeonConfig,
    classifier: TerrainClassifier,
    extractor: RoomExtractor,
    connector: CorridorConnector,
    lighting: LightPropagator,
}

impl DungeonGenerator {
    pub fn new(config: &DungeonConfig) -> Self {
        let dims = config.chunk_dims;
        Self {
            classifier: TerrainClassifier::new(config.terrain.clone(), dims, config.seed),
            extractor: RoomExtractor::new(config.rooms.clone(), dims, config.seed),
            connector: CorridorConnector::new(config.corridors.clone()),
            lighting: LightPropagator::new(config.lighting.clone(), config.seed),
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn classifier(&self) -> &TerrainClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &RoomExtractor {
        &self.extractor
    }

    pub fn lighting(&self) -> &LightPropagator {
        &self.lighting
    }

    /// Register the rooms and corridors chunk `coord` contributes.
    pub fn layout(&self, coord: ChunkCoord, registry: &mut DungeonRegistry) -> LayoutOutcome {
        let mut outcome = LayoutOutcome::default();

        if registry.is_processed(coord) {
            registry.restore_index(coord);
        } else {
            let terrain = self.classifier.classify(coord);
            let padding = self.config.rooms.padding as i32;
            let area = coord.world_bounds(self.config.chunk_dims).expanded(padding);
            let reserved: Vec<GridAabb> = registry.rooms_within(&area).iter().map(|r| r.bounds).collect();

            for bounds in self.extractor.extract(coord, &terrain, &reserved) {
                if let Some(id) = registry.register_room(bounds) {
                    outcome.rooms_added.push(id);
                }
            }
            registry.mark_processed(coord);
            outcome.extracted = true;
        }

        let radius = self.config.corridors.neighborhood_radius;
        let (plans, area_ids) = {
            let area = registry.rooms_near(coord, radius);
            if !area.iter().any(|r| registry.is_pending(r.id)) {
                return outcome;
            }
            let mut rng = chunk_rng(self.config.seed, coord, CORRIDOR_SALT);
            let plans = self.connector.connect(&area, registry.links(), |id| registry.is_pending(id), &mut rng);
            let ids: Vec<RoomId> = area.iter().map(|r| r.id).collect();
            (plans, ids)
        };
        registry.clear_pending(area_ids);

        let mut touched = std::collections::BTreeSet::new();
        for plan in plans {
            let id = registry.register_corridor(plan);
            if let Some(corridor) = registry.corridor(id) {
                touched.extend(corridor.affected_chunks.iter().copied().filter(|&c| c != coord));
            }
            outcome.corridors_added.push(id);
        }
        outcome.touched_chunks = touched.into_iter().collect();

        log::debug!(
            "Laid out {:?}: {} rooms, {} corridors",
            coord,
            outcome.rooms_added.len(),
            outcome.corridors_added.len()
        );
        outcome
    }

    /// Carve and light `coord` from the registry into the given buffers.
    pub fn build(
        &self,
        coord: ChunkCoord,
        registry: &DungeonRegistry,
        voxels: &mut VoxelField,
        light: &mut LightField,
    ) -> Result<()> {
        let dims = self.config.chunk_dims;
        if voxels.dims() != dims || light.dims() != dims {
            return Err(Error::generation(
                coord,
                format!("buffer dims {:?} do not match chunk dims {:?}", voxels.dims(), dims),
            ));
        }

        carve::carve_into(voxels, coord, registry.rooms_touching(coord), registry.corridors_touching(coord));
        let lit = self.lighting.compute(voxels, coord);
        light.copy_from(&lit);
        Ok(())
    }

    /// Lay out then build `coord`.
    pub fn generate(
        &self,
        coord: ChunkCoord,
        registry: &mut DungeonRegistry,
        voxels: &mut VoxelField,
        light: &mut LightField,
    ) -> Result<LayoutOutcome> {
        let outcome = self.layout(coord, registry);
        self.build(coord, registry, voxels, light)?;
        Ok(outcome)
    }
}
