//! Corridors: L-shaped voxel paths between two rooms

use std::collections::BTreeSet;

use crate::core::types::IVec3;
use crate::dungeon::room::RoomId;
use crate::math::GridAabb;
use crate::voxel::chunk::{ChunkCoord, ChunkDims};

/// Registry-assigned corridor identifier; increases monotonically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorridorId(pub u32);

/// A corridor produced by the connector, not yet registered.
#[derive(Clone, Debug, PartialEq)]
pub struct CorridorPlan {
    pub room_a: RoomId,
    pub room_b: RoomId,
    pub start: IVec3,
    pub end: IVec3,
    pub width: u32,
    pub height: u32,
    pub path: Vec<IVec3>,
}

/// A registered corridor. Immutable once registered.
#[derive(Clone, Debug, PartialEq)]
pub struct Corridor {
    pub id: CorridorId,
    pub room_a: RoomId,
    pub room_b: RoomId,
    pub start: IVec3,
    pub end: IVec3,
    pub width: u32,
    pub height: u32,
    /// Ordered world cells from `start` to `end`.
    pub path: Vec<IVec3>,
    /// Chunks touched by any path cell's extruded cross-section.
    pub affected_chunks: Vec<ChunkCoord>,
}

impl Corridor {
    pub fn new(id: CorridorId, plan: CorridorPlan, dims: ChunkDims) -> Self {
        let mut chunks = BTreeSet::new();
        for i in 0..plan.path.len() {
            let section = cross_section(&plan.path, i, plan.width, plan.height);
            chunks.extend(ChunkCoord::span(section, dims));
        }

        Self {
            id,
            room_a: plan.room_a,
            room_b: plan.room_b,
            start: plan.start,
            end: plan.end,
            width: plan.width,
            height: plan.height,
            path: plan.path,
            affected_chunks: chunks.into_iter().collect(),
        }
    }

    /// Solid box stamped around path cell `index`.
    pub fn cross_section(&self, index: usize) -> GridAabb {
        cross_section(&self.path, index, self.width, self.height)
    }
}

/// Walk from `start` to `end` one unit step at a time, always resolving the
/// X difference first, then Y, then Z. Both endpoints are included.
pub fn line_path(start: IVec3, end: IVec3) -> Vec<IVec3> {
    let d = (end - start).abs();
    let mut path = Vec::with_capacity((d.x + d.y + d.z + 1) as usize);
    let mut cur = start;
    path.push(cur);
    while cur != end {
        if cur.x != end.x {
            cur.x += (end.x - cur.x).signum();
        } else if cur.y != end.y {
            cur.y += (end.y - cur.y).signum();
        } else {
            cur.z += (end.z - cur.z).signum();
        }
        path.push(cur);
    }
    path
}

/// Cross-section box of a path cell.
///
/// A cell whose neighbor along the path differs in X runs horizontally along
/// X, so its section spans Z (width) and Y (height); every other cell spans
/// X (width) and Y (height). Sections are centered on the path line.
pub fn cross_section(path: &[IVec3], index: usize, width: u32, height: u32) -> GridAabb {
    let cell = path[index];
    let adjacent = path.get(index + 1).or_else(|| index.checked_sub(1).and_then(|i| path.get(i)));
    let along_x = adjacent.is_some_and(|a| a.x != cell.x);

    let lo_w = -(width as i32 - 1) / 2;
    let hi_w = lo_w + width as i32 - 1;
    let lo_h = -(height as i32 - 1) / 2;
    let hi_h = lo_h + height as i32 - 1;

    if along_x {
        GridAabb::new(
            cell + IVec3::new(0, lo_h, lo_w),
            cell + IVec3::new(0, hi_h, hi_w),
        )
    } else {
        GridAabb::new(
            cell + IVec3::new(lo_w, lo_h, 0),
            cell + IVec3::new(hi_w, hi_h, 0),
        )
    }
}
