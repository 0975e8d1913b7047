//! Carving: stamps rooms and corridors into a fresh chunk field.

use crate::dungeon::corridor::Corridor;
use crate::dungeon::room::Room;
use crate::math::GridAabb;
use crate::voxel::chunk::{ChunkCoord, ChunkDims};
use crate::voxel::grid::VoxelField;

/// Build the carved field of `coord` from the rooms and corridors that touch it.
///
/// The result depends only on the entities passed in, so re-carving a chunk
/// with the same registry contents always yields the same field.
pub fn carve_chunk<'a>(
    coord: ChunkCoord,
    dims: ChunkDims,
    rooms: impl IntoIterator<Item = &'a Room>,
    corridors: impl IntoIterator<Item = &'a Corridor>,
) -> VoxelField {
    let mut field = VoxelField::empty(dims);
    carve_into(&mut field, coord, rooms, corridors);
    field
}

/// Clear `field` and stamp rooms and corridors into it.
pub fn carve_into<'a>(
    field: &mut VoxelField,
    coord: ChunkCoord,
    rooms: impl IntoIterator<Item = &'a Room>,
    corridors: impl IntoIterator<Item = &'a Corridor>,
) {
    let dims = field.dims();
    let chunk = coord.world_bounds(dims);
    field.fill(false);

    for room in rooms {
        stamp(field, &chunk, room.bounds);
    }

    for corridor in corridors {
        for i in 0..corridor.path.len() {
            stamp(field, &chunk, corridor.cross_section(i));
        }
    }
}

/// Set every cell of `bounds` that falls inside `chunk` solid.
fn stamp(field: &mut VoxelField, chunk: &GridAabb, bounds: GridAabb) {
    let Some(clipped) = chunk.intersection(&bounds) else {
        return;
    };
    for p in clipped.translated(-chunk.min).cells() {
        field.set(p, true);
    }
}
