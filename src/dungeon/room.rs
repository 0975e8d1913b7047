//! Registered rooms

use crate::core::types::{IVec3, Vec3};
use crate::math::GridAabb;
use crate::voxel::chunk::{ChunkCoord, ChunkDims};

/// Registry-assigned room identifier; increases monotonically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub u32);

/// A committed cuboid room.
///
/// Bounds are inclusive world voxel corners. Immutable once registered.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub bounds: GridAabb,
    pub center: Vec3,
    pub size: IVec3,
    /// Every chunk the bounds overlap, computed once at registration.
    pub occupied_chunks: Vec<ChunkCoord>,
}

impl Room {
    pub fn new(id: RoomId, bounds: GridAabb, dims: ChunkDims) -> Self {
        Self {
            id,
            bounds,
            center: bounds.center(),
            size: bounds.size(),
            occupied_chunks: ChunkCoord::span(bounds, dims).collect(),
        }
    }

    pub fn min(&self) -> IVec3 {
        self.bounds.min
    }

    pub fn max(&self) -> IVec3 {
        self.bounds.max
    }

    /// Center cells of the six faces: -X, +X, -Y, +Y, -Z, +Z.
    pub fn face_centers(&self) -> [IVec3; 6] {
        let c = self.bounds.center_cell();
        let (min, max) = (self.bounds.min, self.bounds.max);
        [
            IVec3::new(min.x, c.y, c.z),
            IVec3::new(max.x, c.y, c.z),
            IVec3::new(c.x, min.y, c.z),
            IVec3::new(c.x, max.y, c.z),
            IVec3::new(c.x, c.y, min.z),
            IVec3::new(c.x, c.y, max.z),
        ]
    }

    /// Face center nearest to `target`; ties resolve in face order.
    pub fn closest_face_point(&self, target: Vec3) -> IVec3 {
        let faces = self.face_centers();
        let mut best = faces[0];
        let mut best_d = best.as_vec3().distance_squared(target);
        for &p in &faces[1..] {
            let d = p.as_vec3().distance_squared(target);
            if d < best_d {
                best = p;
                best_d = d;
            }
        }
        best
    }

    /// Euclidean distance between room centers.
    pub fn distance_to(&self, other: &Room) -> f32 {
        self.center.distance(other.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(min: IVec3, size: IVec3) -> Room {
        Room::new(RoomId(1), GridAabb::from_min_size(min, size), ChunkDims::cube(16))
    }

    #[test]
    fn test_room_derived_fields() {
        let r = room(IVec3::new(14, 0, 0), IVec3::new(4, 5, 6));
        assert_eq!(r.size, IVec3::new(4, 5, 6));
        assert_eq!(r.max(), IVec3::new(17, 4, 5));
        assert_eq!(r.center, Vec3::new(15.5, 2.0, 2.5));
        assert_eq!(r.occupied_chunks, vec![ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 0)]);
    }

    #[test]
    fn test_closest_face_point() {
        let r = room(IVec3::ZERO, IVec3::splat(5));
        assert_eq!(r.closest_face_point(Vec3::new(100.0, 2.0, 2.0)), IVec3::new(4, 2, 2));
        assert_eq!(r.closest_face_point(Vec3::new(2.0, -50.0, 2.0)), IVec3::new(2, 0, 2));
        assert_eq!(r.closest_face_point(Vec3::new(2.0, 2.0, 40.0)), IVec3::new(2, 2, 4));
    }
}
