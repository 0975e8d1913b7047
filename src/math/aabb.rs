//! Axis-aligned integer bounding box over voxel cells

use crate::core::types::{IVec3, Vec3};

/// Axis-aligned box of voxel cells defined by inclusive min and max corners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridAabb {
    pub min: IVec3,
    pub max: IVec3,
}

impl GridAabb {
    /// Create a box from inclusive min and max corners
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Create a box from its min corner and a per-axis cell count
    pub fn from_min_size(min: IVec3, size: IVec3) -> Self {
        Self { min, max: min + size - IVec3::ONE }
    }

    /// Number of cells along each axis (`max - min + 1`)
    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    /// Number of cells enclosed
    pub fn volume(&self) -> i64 {
        let s = self.size();
        s.x as i64 * s.y as i64 * s.z as i64
    }

    /// Geometric center of the enclosed cells
    pub fn center(&self) -> Vec3 {
        (self.min.as_vec3() + self.max.as_vec3()) * 0.5
    }

    /// Center cell, rounding toward `min`
    pub fn center_cell(&self) -> IVec3 {
        IVec3::new(
            (self.min.x + self.max.x).div_euclid(2),
            (self.min.y + self.max.y).div_euclid(2),
            (self.min.z + self.max.z).div_euclid(2),
        )
    }

    /// Check if a cell lies inside the box
    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if two boxes share at least one cell
    pub fn intersects(&self, other: &GridAabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Box grown by `amount` cells on every face
    pub fn expanded(&self, amount: i32) -> GridAabb {
        GridAabb {
            min: self.min - IVec3::splat(amount),
            max: self.max + IVec3::splat(amount),
        }
    }

    /// Overlapping region of two boxes, if any
    pub fn intersection(&self, other: &GridAabb) -> Option<GridAabb> {
        if !self.intersects(other) {
            return None;
        }
        Some(GridAabb {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    /// Box translated by `offset`
    pub fn translated(&self, offset: IVec3) -> GridAabb {
        GridAabb { min: self.min + offset, max: self.max + offset }
    }

    /// Iterate all enclosed cells in x-fastest order
    pub fn cells(self) -> impl Iterator<Item = IVec3> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let b = GridAabb::new(IVec3::ZERO, IVec3::new(3, 1, 0));
        assert_eq!(b.size(), IVec3::new(4, 2, 1));
        assert_eq!(b.volume(), 8);
        assert_eq!(b.center(), Vec3::new(1.5, 0.5, 0.0));
        assert_eq!(b.center_cell(), IVec3::new(1, 0, 0));
    }

    #[test]
    fn test_from_min_size() {
        let b = GridAabb::from_min_size(IVec3::new(-2, 0, 5), IVec3::splat(4));
        assert_eq!(b.max, IVec3::new(1, 3, 8));
        assert_eq!(b.size(), IVec3::splat(4));
    }

    #[test]
    fn test_contains() {
        let b = GridAabb::new(IVec3::ZERO, IVec3::ONE);
        assert!(b.contains(IVec3::ONE));
        assert!(!b.contains(IVec3::splat(2)));
        assert!(!b.contains(IVec3::new(0, -1, 0)));
    }

    #[test]
    fn test_intersects_is_inclusive() {
        let a = GridAabb::new(IVec3::ZERO, IVec3::splat(3));
        let touching = GridAabb::new(IVec3::new(3, 0, 0), IVec3::new(6, 3, 3));
        let apart = GridAabb::new(IVec3::new(4, 0, 0), IVec3::new(6, 3, 3));
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
        // Separated on a single axis is enough
        let above = GridAabb::new(IVec3::new(0, 4, 0), IVec3::new(3, 5, 3));
        assert!(!a.intersects(&above));
    }

    #[test]
    fn test_intersection_and_expand() {
        let a = GridAabb::new(IVec3::ZERO, IVec3::splat(3));
        let b = GridAabb::new(IVec3::splat(2), IVec3::splat(5));
        assert_eq!(a.intersection(&b), Some(GridAabb::new(IVec3::splat(2), IVec3::splat(3))));
        assert_eq!(a.expanded(1).min, IVec3::splat(-1));
        assert_eq!(a.expanded(1).max, IVec3::splat(4));
    }

    #[test]
    fn test_cells_visits_volume() {
        let b = GridAabb::new(IVec3::new(-1, 0, 0), IVec3::new(1, 1, 2));
        let cells: Vec<_> = b.cells().collect();
        assert_eq!(cells.len() as i64, b.volume());
        assert_eq!(cells[0], b.min);
        assert_eq!(*cells.last().unwrap(), b.max);
    }
}
