//! Chunk lattice: coordinates, per-world chunk dimensions and face directions

use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;
use crate::math::{floor_div, floor_mod, GridAabb};

/// Number of voxels along each axis of a chunk
///
/// Chunks need not be cubic, e.g. 80x40x80.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl ChunkDims {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn cube(size: u32) -> Self {
        Self { x: size, y: size, z: size }
    }

    /// Total voxel count
    pub fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }

    /// Check if a chunk-local position is inside the chunk
    pub fn contains(&self, local: IVec3) -> bool {
        local.x >= 0 && local.y >= 0 && local.z >= 0 &&
        local.x < self.x as i32 && local.y < self.y as i32 && local.z < self.z as i32
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::cube(32)
    }
}

/// Integer coordinate identifying a chunk in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    pub fn from_ivec3(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Chunk containing a world voxel position
    pub fn from_world_voxel(pos: IVec3, dims: ChunkDims) -> Self {
        Self::from_ivec3(floor_div(pos, dims.as_ivec3()))
    }

    /// Chunk containing a continuous world position (voxel units)
    pub fn from_world_pos(pos: crate::core::types::Vec3, dims: ChunkDims) -> Self {
        Self::from_world_voxel(pos.floor().as_ivec3(), dims)
    }

    /// World-space voxel position of this chunk's minimum corner
    pub fn world_origin(&self, dims: ChunkDims) -> IVec3 {
        self.as_ivec3() * dims.as_ivec3()
    }

    /// World-space bounds of every voxel in this chunk
    pub fn world_bounds(&self, dims: ChunkDims) -> GridAabb {
        GridAabb::from_min_size(self.world_origin(dims), dims.as_ivec3())
    }

    /// Chebyshev distance (max per-axis difference) in chunks
    pub fn chebyshev(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Neighbor across the given face
    pub fn neighbor(&self, face: Face) -> ChunkCoord {
        Self::from_ivec3(self.as_ivec3() + face.normal())
    }

    /// The six face-adjacent neighbors
    pub fn face_neighbors(&self) -> [ChunkCoord; 6] {
        Face::ALL.map(|f| self.neighbor(f))
    }

    /// Every chunk within Chebyshev `radius`, in x-fastest order
    pub fn within_radius(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        let c = self;
        (-radius..=radius).flat_map(move |dy| {
            (-radius..=radius).flat_map(move |dz| {
                (-radius..=radius).map(move |dx| ChunkCoord::new(c.x + dx, c.y + dy, c.z + dz))
            })
        })
    }

    /// Inclusive range of chunks spanned by a world-space box
    pub fn span(bounds: GridAabb, dims: ChunkDims) -> impl Iterator<Item = ChunkCoord> {
        let lo = floor_div(bounds.min, dims.as_ivec3());
        let hi = floor_div(bounds.max, dims.as_ivec3());
        GridAabb::new(lo, hi).cells().map(Self::from_ivec3)
    }
}

/// Split a world voxel position into its chunk and chunk-local position
pub fn world_to_local(pos: IVec3, dims: ChunkDims) -> (ChunkCoord, IVec3) {
    (ChunkCoord::from_world_voxel(pos, dims), floor_mod(pos, dims.as_ivec3()))
}

/// One of the six axis directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::PosX, Face::NegX, Face::PosY, Face::NegY, Face::PosZ, Face::NegZ];

    /// Unit step in this direction
    pub fn normal(&self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    pub fn opposite(&self) -> Face {
        match self {
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ChunkDims = ChunkDims::new(80, 40, 80);

    #[test]
    fn test_chunk_coord_new() {
        let coord = ChunkCoord::new(1, 2, 3);
        assert_eq!(coord.x, 1);
        assert_eq!(coord.y, 2);
        assert_eq!(coord.z, 3);
    }

    #[test]
    fn test_from_world_voxel() {
        assert_eq!(ChunkCoord::from_world_voxel(IVec3::new(0, 0, 0), DIMS), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_world_voxel(IVec3::new(80, 39, 79), DIMS), ChunkCoord::new(1, 0, 0));
        assert_eq!(ChunkCoord::from_world_voxel(IVec3::new(-1, -1, -81), DIMS), ChunkCoord::new(-1, -1, -2));
    }

    #[test]
    fn test_world_origin_round_trip() {
        let original = ChunkCoord::new(5, -3, 10);
        let origin = original.world_origin(DIMS);
        assert_eq!(origin, IVec3::new(400, -120, 800));
        let (coord, local) = world_to_local(origin + IVec3::new(79, 39, 0), DIMS);
        assert_eq!(coord, original);
        assert_eq!(local, IVec3::new(79, 39, 0));
    }

    #[test]
    fn test_chebyshev() {
        let a = ChunkCoord::new(0, 0, 0);
        assert_eq!(a.chebyshev(ChunkCoord::new(3, -1, 2)), 3);
        assert_eq!(a.chebyshev(a), 0);
    }

    #[test]
    fn test_within_radius_count() {
        let c = ChunkCoord::new(4, 4, 4);
        let all: Vec<_> = c.within_radius(1).collect();
        assert_eq!(all.len(), 27);
        assert!(all.iter().all(|n| n.chebyshev(c) <= 1));
    }

    #[test]
    fn test_span_crosses_chunks() {
        let bounds = GridAabb::new(IVec3::new(78, 0, -2), IVec3::new(82, 5, 1));
        let chunks: Vec<_> = ChunkCoord::span(bounds, DIMS).collect();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.contains(&ChunkCoord::new(0, 0, -1)));
        assert!(chunks.contains(&ChunkCoord::new(1, 0, 0)));
    }

    #[test]
    fn test_face_neighbors() {
        let c = ChunkCoord::new(0, 0, 0);
        let n = c.face_neighbors();
        assert_eq!(n.len(), 6);
        assert!(n.iter().all(|x| x.chebyshev(c) == 1));
        assert_eq!(c.neighbor(Face::NegY), ChunkCoord::new(0, -1, 0));
        assert_eq!(Face::PosZ.opposite(), Face::NegZ);
    }

    #[test]
    fn test_dims_contains() {
        assert!(DIMS.contains(IVec3::new(79, 39, 79)));
        assert!(!DIMS.contains(IVec3::new(80, 0, 0)));
        assert!(!DIMS.contains(IVec3::new(0, -1, 0)));
        assert_eq!(DIMS.volume(), 80 * 40 * 80);
    }
}
