//! Corridor connector: joins the rooms of a local area into one connected graph.
//!
//! A Prim minimum spanning tree over room centers gives the backbone. Edges
//! between rooms that earlier corridors already connected are skipped. A few
//! random extra edges add loops.

use rand::Rng;

use crate::dungeon::corridor::{CorridorPlan, line_path};
use crate::dungeon::graph::{DisjointSet, RoomLinks};
use crate::dungeon::room::{Room, RoomId};
use crate::generation::config::CorridorParams;

/// Plans corridors between rooms.
pub struct CorridorConnector {
    params: CorridorParams,
}

impl CorridorConnector {
    pub fn new(params: CorridorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CorridorParams {
        &self.params
    }

    /// Plan corridors that connect `rooms`.
    ///
    /// `links` holds the corridors already registered; spanning-tree edges
    /// inside an existing component produce nothing. Extra edges are drawn
    /// only from rooms `is_new` accepts, count `max(1, new / divisor)`, and
    /// never duplicate a direct link.
    pub fn connect(
        &self,
        rooms: &[&Room],
        links: &RoomLinks,
        is_new: impl Fn(RoomId) -> bool,
        rng: &mut impl Rng,
    ) -> Vec<CorridorPlan> {
        let n = rooms.len();
        if n < 2 {
            return Vec::new();
        }

        let mut components = DisjointSet::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if links.connected(rooms[i].id, rooms[j].id) {
                    components.union(i, j);
                }
            }
        }

        let mut chosen: Vec<(usize, usize)> = Vec::new();
        for (i, j) in minimum_spanning_tree(rooms) {
            if components.union(i, j) {
                chosen.push((i, j));
            }
        }

        let fresh: Vec<usize> = (0..n).filter(|&i| is_new(rooms[i].id)).collect();
        if !fresh.is_empty() {
            let extras = (fresh.len() / self.params.extra_edge_divisor.max(1) as usize).max(1);
            for _ in 0..extras {
                let i = fresh[rng.gen_range(0..fresh.len())];
                let j = rng.gen_range(0..n);
                if i == j || links.linked(rooms[i].id, rooms[j].id) {
                    continue;
                }
                if chosen.iter().any(|&(a, b)| (a, b) == (i, j) || (a, b) == (j, i)) {
                    continue;
                }
                chosen.push((i, j));
            }
        }

        chosen
            .into_iter()
            .map(|(i, j)| self.plan(rooms[i], rooms[j], rng))
            .collect()
    }

    /// Lay out a single corridor from `a` to `b`.
    pub fn plan(&self, a: &Room, b: &Room, rng: &mut impl Rng) -> CorridorPlan {
        let start = a.closest_face_point(b.center);
        let end = b.closest_face_point(a.center);
        let width = rng.gen_range(self.params.min_width..=self.params.max_width);
        let height = rng.gen_range(self.params.min_height..=self.params.max_height);

        CorridorPlan {
            room_a: a.id,
            room_b: b.id,
            start,
            end,
            width,
            height,
            path: line_path(start, end),
        }
    }
}

/// Prim's algorithm over room centers, growing from the first room.
///
/// Returns `(in_tree, added)` index pairs in the order edges were taken.
pub fn minimum_spanning_tree(rooms: &[&Room]) -> Vec<(usize, usize)> {
    let n = rooms.len();
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f32::INFINITY; n];
    let mut from = vec![0usize; n];
    in_tree[0] = true;
    for j in 1..n {
        best[j] = rooms[0].distance_to(rooms[j]);
    }

    let mut edges = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next = None;
        for j in 0..n {
            if !in_tree[j] && next.is_none_or(|k: usize| best[j] < best[k]) {
                next = Some(j);
            }
        }
        let Some(j) = next else { break };

        in_tree[j] = true;
        edges.push((from[j], j));

        for k in 0..n {
            if in_tree[k] {
                continue;
            }
            let d = rooms[j].distance_to(rooms[k]);
            if d < best[k] {
                best[k] = d;
                from[k] = j;
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::generation::chunk_rng;
    use crate::math::GridAabb;
    use crate::voxel::chunk::{ChunkCoord, ChunkDims};

    fn rooms(mins: &[IVec3]) -> Vec<Room> {
        mins.iter()
            .enumerate()
            .map(|(i, &m)| {
                Room::new(RoomId(i as u32 + 1), GridAabb::from_min_size(m, IVec3::splat(4)), ChunkDims::cube(32))
            })
            .collect()
    }

    fn layout() -> Vec<Room> {
        rooms(&[
            IVec3::new(0, 0, 0),
            IVec3::new(20, 0, 0),
            IVec3::new(0, 0, 30),
            IVec3::new(50, 10, 10),
            IVec3::new(25, 20, 40),
        ])
    }

    fn rng() -> rand_chacha::ChaCha8Rng {
        chunk_rng(7, ChunkCoord::new(0, 0, 0), 1)
    }

    fn assert_connected(n: usize, rooms: &[Room], plans: &[CorridorPlan]) {
        let mut set = DisjointSet::new();
        for p in plans {
            set.union(p.room_a, p.room_b);
        }
        for r in &rooms[1..n] {
            assert!(set.same(rooms[0].id, r.id), "room {:?} unreachable", r.id);
        }
    }

    #[test]
    fn test_mst_has_n_minus_one_edges() {
        let rooms = layout();
        let refs: Vec<&Room> = rooms.iter().collect();
        let edges = minimum_spanning_tree(&refs);
        assert_eq!(edges.len(), 4);
        // Nearest neighbor of the first room joins first
        assert_eq!(edges[0], (0, 1));
    }

    #[test]
    fn test_connect_five_rooms() {
        let rooms = layout();
        let refs: Vec<&Room> = rooms.iter().collect();
        let plans = CorridorConnector::new(CorridorParams::default()).connect(&refs, &RoomLinks::new(), |_| true, &mut rng());

        // 4 spanning edges plus max(1, 5 / 4) = 1 extra, unless the extra draw was rejected
        assert!(plans.len() == 4 || plans.len() == 5, "got {}", plans.len());
        assert_connected(5, &rooms, &plans);
        for (i, a) in plans.iter().enumerate() {
            assert_ne!(a.room_a, a.room_b);
            for b in &plans[i + 1..] {
                assert!(!(a.room_a == b.room_a && a.room_b == b.room_b));
                assert!(!(a.room_a == b.room_b && a.room_b == b.room_a));
            }
        }
    }

    #[test]
    fn test_connect_skips_already_connected_rooms() {
        let rooms = layout();
        let refs: Vec<&Room> = rooms.iter().collect();
        let mut links = RoomLinks::new();
        links.link(rooms[0].id, rooms[1].id);
        links.link(rooms[1].id, rooms[2].id);

        let plans = CorridorConnector::new(CorridorParams::default()).connect(&refs, &links, |id| id.0 > 3, &mut rng());
        // Three components need two joins, plus at most one extra
        assert!(plans.len() == 2 || plans.len() == 3, "got {}", plans.len());
        for p in &plans {
            assert!(!links.linked(p.room_a, p.room_b));
        }

        let mut all = links.clone();
        for p in &plans {
            all.link(p.room_a, p.room_b);
        }
        for r in &rooms[1..] {
            assert!(all.connected(rooms[0].id, r.id));
        }
    }

    #[test]
    fn test_extra_edges_start_at_new_rooms() {
        let rooms = layout();
        let refs: Vec<&Room> = rooms.iter().collect();
        let mut links = RoomLinks::new();
        for pair in rooms[..4].windows(2) {
            links.link(pair[0].id, pair[1].id);
        }
        let new_room = rooms[4].id;
        let connector = CorridorConnector::new(CorridorParams { extra_edge_divisor: 1, ..Default::default() });

        for seed in 0..20 {
            let mut rng = chunk_rng(seed, ChunkCoord::new(0, 0, 0), 1);
            let plans = connector.connect(&refs, &links, |id| id == new_room, &mut rng);
            assert!(!plans.is_empty());
            for p in &plans {
                assert!(p.room_a == new_room || p.room_b == new_room, "seed {seed}: {:?}-{:?}", p.room_a, p.room_b);
            }
        }
    }

    #[test]
    fn test_single_room_needs_nothing() {
        let rooms = layout();
        let plans = CorridorConnector::new(CorridorParams::default()).connect(&[&rooms[0]], &RoomLinks::new(), |_| true, &mut rng());
        assert!(plans.is_empty());
    }

    #[test]
    fn test_plan_path_shape() {
        let rooms = layout();
        let connector = CorridorConnector::new(CorridorParams::default());
        let plan = connector.plan(&rooms[0], &rooms[4], &mut rng());

        assert_eq!(plan.path.first(), Some(&plan.start));
        assert_eq!(plan.path.last(), Some(&plan.end));
        assert!(rooms[0].bounds.contains(plan.start));
        assert!(rooms[4].bounds.contains(plan.end));
        assert!((1..=3).contains(&plan.width));
        assert!((2..=3).contains(&plan.height));

        // Unit single-axis steps, axis runs in X, Y, Z order
        let mut axis_seen = 0;
        for w in plan.path.windows(2) {
            let d = (w[1] - w[0]).abs();
            assert_eq!(d.x + d.y + d.z, 1);
            let axis = if d.x == 1 { 0 } else if d.y == 1 { 1 } else { 2 };
            assert!(axis >= axis_seen);
            axis_seen = axis;
        }
    }
}
