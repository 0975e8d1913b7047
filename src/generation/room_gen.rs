//! Room extractor: greedy randomized packing of cuboid rooms into solid terrain.
//!
//! Every stride-sampled solid cell is a potential room anchor. A cheap probe
//! rejects anchors whose minimum cube is visibly broken, axis run lengths
//! bound the room size, and a handful of random sizes are validated by sparse
//! sampling. The largest valid cuboid wins and is fenced off (with padding)
//! so later anchors skip it.
//!
//! Sampling can accept a cuboid that hides a few empty cells; it never
//! rejects a fully solid one. Setting `fit_samples` to at least the largest
//! room volume turns validation into an exhaustive check.

use rand::Rng;

use crate::core::types::IVec3;
use crate::generation::config::RoomParams;
use crate::generation::chunk_rng;
use crate::math::GridAabb;
use crate::voxel::chunk::{ChunkCoord, ChunkDims};
use crate::voxel::grid::VoxelField;

const ROOM_SALT: u64 = 0x524F_4F4D;

/// Extracts candidate room bounds from a classified chunk.
pub struct RoomExtractor {
    params: RoomParams,
    dims: ChunkDims,
    seed: u64,
}

impl RoomExtractor {
    pub fn new(params: RoomParams, dims: ChunkDims, seed: u64) -> Self {
        Self { params, dims, seed }
    }

    pub fn params(&self) -> &RoomParams {
        &self.params
    }

    /// Scan `field` and return world-space room bounds in scan order.
    ///
    /// `reserved` holds world bounds of rooms registered earlier; they (and
    /// their padding) are treated as occupied.
    pub fn extract(&self, coord: ChunkCoord, field: &VoxelField, reserved: &[GridAabb]) -> Vec<GridAabb> {
        let mut rng = chunk_rng(self.seed, coord, ROOM_SALT);
        let origin = coord.world_origin(self.dims);
        let padding = self.params.padding as i32;
        let stride = self.params.scan_stride as usize;
        let min = self.params.min_room_size as i32;

        let mut occupied = VoxelField::empty(self.dims);
        for bounds in reserved {
            mark(&mut occupied, bounds.translated(-origin).expanded(padding));
        }

        let mut rooms = Vec::new();
        for y in (0..self.dims.y as i32).step_by(stride) {
            for z in (0..self.dims.z as i32).step_by(stride) {
                for x in (0..self.dims.x as i32).step_by(stride) {
                    let anchor = IVec3::new(x, y, z);
                    if occupied.is_solid(anchor) || !field.is_solid(anchor) {
                        continue;
                    }
                    if !self.probe(field, anchor, &mut rng) {
                        continue;
                    }

                    let extents = self.extents(field, &occupied, anchor);
                    if extents.min_element() < min {
                        continue;
                    }

                    if let Some(size) = self.best_fit(field, &occupied, anchor, extents, &mut rng) {
                        let local = GridAabb::from_min_size(anchor, size);
                        mark(&mut occupied, local.expanded(padding));
                        rooms.push(local.translated(origin));
                    }
                }
            }
        }

        log::debug!("Chunk {:?}: extracted {} room candidates", coord, rooms.len());
        rooms
    }

    /// Sample a few cells of the minimum cube; any empty sample rejects.
    fn probe(&self, field: &VoxelField, anchor: IVec3, rng: &mut impl Rng) -> bool {
        let min = self.params.min_room_size as i32;
        (0..self.params.probe_samples).all(|_| {
            let offset = IVec3::new(
                rng.gen_range(0..min),
                rng.gen_range(0..min),
                rng.gen_range(0..min),
            );
            field.is_solid(anchor + offset)
        })
    }

    /// Free solid run length from `anchor` along +X, +Y and +Z, capped at the max room size.
    fn extents(&self, field: &VoxelField, occupied: &VoxelField, anchor: IVec3) -> IVec3 {
        let max = self.params.max_room_size as i32;
        let run = |axis: IVec3| {
            let mut len = 0;
            while len < max && is_free(field, occupied, anchor + axis * len) {
                len += 1;
            }
            len
        };
        IVec3::new(run(IVec3::X), run(IVec3::Y), run(IVec3::Z))
    }

    /// Try random sizes within `extents` and keep the largest that validates.
    fn best_fit(
        &self,
        field: &VoxelField,
        occupied: &VoxelField,
        anchor: IVec3,
        extents: IVec3,
        rng: &mut impl Rng,
    ) -> Option<IVec3> {
        let min = self.params.min_room_size as i32;
        let mut best: Option<(IVec3, i64)> = None;

        // The minimum cube goes first so a valid anchor always yields a room
        let minimum = IVec3::splat(min);
        if self.fits(field, occupied, anchor, minimum, rng) {
            best = Some((minimum, volume(minimum)));
        }

        for _ in 0..self.params.fit_trials {
            let size = IVec3::new(
                rng.gen_range(min..=extents.x),
                rng.gen_range(min..=extents.y),
                rng.gen_range(min..=extents.z),
            );
            let v = volume(size);
            if best.is_some_and(|(_, best_v)| v <= best_v) {
                continue;
            }
            if self.fits(field, occupied, anchor, size, rng) {
                best = Some((size, v));
            }
        }

        best.map(|(size, _)| size)
    }

    /// Validate a cuboid against solidity and occupancy.
    fn fits(
        &self,
        field: &VoxelField,
        occupied: &VoxelField,
        anchor: IVec3,
        size: IVec3,
        rng: &mut impl Rng,
    ) -> bool {
        let bounds = GridAabb::from_min_size(anchor, size);
        if (self.params.fit_samples as i64) >= bounds.volume() {
            return bounds.cells().all(|p| is_free(field, occupied, p));
        }

        let corners_ok = (0..8).all(|i| {
            let corner = IVec3::new(
                if i & 1 != 0 { bounds.max.x } else { bounds.min.x },
                if i & 2 != 0 { bounds.max.y } else { bounds.min.y },
                if i & 4 != 0 { bounds.max.z } else { bounds.min.z },
            );
            is_free(field, occupied, corner)
        });

        corners_ok && (0..self.params.fit_samples).all(|_| {
            let p = IVec3::new(
                rng.gen_range(bounds.min.x..=bounds.max.x),
                rng.gen_range(bounds.min.y..=bounds.max.y),
                rng.gen_range(bounds.min.z..=bounds.max.z),
            );
            is_free(field, occupied, p)
        })
    }
}

#[inline]
fn is_free(field: &VoxelField, occupied: &VoxelField, p: IVec3) -> bool {
    field.is_solid(p) && !occupied.is_solid(p)
}

fn volume(size: IVec3) -> i64 {
    size.x as i64 * size.y as i64 * size.z as i64
}

/// Mark the in-chunk part of a local box as occupied.
fn mark(occupied: &mut VoxelField, local: GridAabb) {
    let chunk = GridAabb::from_min_size(IVec3::ZERO, occupied.dims().as_ivec3());
    if let Some(clipped) = local.intersection(&chunk) {
        for p in clipped.cells() {
            occupied.set(p, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhaustive() -> RoomParams {
        RoomParams { probe_samples: 64, fit_samples: 100_000, ..Default::default() }
    }

    fn solid_box(dims: ChunkDims, bounds: GridAabb) -> VoxelField {
        let mut field = VoxelField::empty(dims);
        for p in bounds.cells() {
            field.set(p, true);
        }
        field
    }

    fn assert_disjoint(rooms: &[GridAabb]) {
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_empty_field_has_no_rooms() {
        let dims = ChunkDims::cube(16);
        let extractor = RoomExtractor::new(RoomParams::default(), dims, 1);
        let rooms = extractor.extract(ChunkCoord::new(0, 0, 0), &VoxelField::empty(dims), &[]);
        assert!(rooms.is_empty());
    }

    #[test]
    fn test_single_min_cube_region_yields_room() {
        let dims = ChunkDims::new(80, 40, 80);
        let region = GridAabb::from_min_size(IVec3::new(10, 20, 30), IVec3::splat(4));
        let field = solid_box(dims, region);
        let extractor = RoomExtractor::new(RoomParams::default(), dims, 7);

        let rooms = extractor.extract(ChunkCoord::new(0, 0, 0), &field, &[]);
        assert_eq!(rooms, vec![region]);
    }

    #[test]
    fn test_rooms_respect_size_bounds_and_solidity() {
        let dims = ChunkDims::cube(32);
        let field = VoxelField::filled(dims, true);
        let params = exhaustive();
        let extractor = RoomExtractor::new(params.clone(), dims, 99);
        let coord = ChunkCoord::new(-1, 2, 0);
        let origin = coord.world_origin(dims);

        let rooms = extractor.extract(coord, &field, &[]);
        assert!(!rooms.is_empty());
        assert_disjoint(&rooms);
        for room in &rooms {
            let size = room.size();
            assert!(size.min_element() >= params.min_room_size as i32);
            assert!(size.max_element() <= params.max_room_size as i32);
            assert!(room.translated(-origin).cells().all(|p| dims.contains(p)));
        }
    }

    #[test]
    fn test_padding_separates_rooms() {
        let dims = ChunkDims::cube(32);
        let field = VoxelField::filled(dims, true);
        let extractor = RoomExtractor::new(exhaustive(), dims, 5);
        let rooms = extractor.extract(ChunkCoord::new(0, 0, 0), &field, &[]);
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.expanded(1).intersects(b), "{:?} touches {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_exhaustive_fit_skips_holes() {
        let dims = ChunkDims::cube(16);
        let mut field = VoxelField::filled(dims, true);
        let hole = IVec3::new(6, 6, 6);
        field.set(hole, false);
        let extractor = RoomExtractor::new(exhaustive(), dims, 11);

        let rooms = extractor.extract(ChunkCoord::new(0, 0, 0), &field, &[]);
        assert!(!rooms.is_empty());
        for room in &rooms {
            assert!(!room.contains(hole), "room {:?} swallowed the hole", room);
            assert!(room.cells().all(|p| field.is_solid(p)));
        }
    }

    #[test]
    fn test_reserved_rooms_are_avoided() {
        let dims = ChunkDims::cube(16);
        let field = VoxelField::filled(dims, true);
        let coord = ChunkCoord::new(1, 0, 0);
        let origin = coord.world_origin(dims);
        let reserved = GridAabb::from_min_size(origin, IVec3::splat(16));
        let extractor = RoomExtractor::new(exhaustive(), dims, 3);

        assert!(extractor.extract(coord, &field, &[reserved]).is_empty());
    }

    #[test]
    fn test_extract_is_deterministic() {
        let dims = ChunkDims::cube(24);
        let field = VoxelField::filled(dims, true);
        let extractor = RoomExtractor::new(RoomParams::default(), dims, 42);
        let coord = ChunkCoord::new(3, 0, -2);
        assert_eq!(extractor.extract(coord, &field, &[]), extractor.extract(coord, &field, &[]));
    }
}
