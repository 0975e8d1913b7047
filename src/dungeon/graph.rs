//! Room connectivity: union-find components plus direct corridor edges

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::dungeon::room::RoomId;

/// Union-find over arbitrary keys. Keys are added lazily on first use.
#[derive(Clone, Debug)]
pub struct DisjointSet<K> {
    parent: HashMap<K, K>,
    rank: HashMap<K, u32>,
}

impl<K> Default for DisjointSet<K> {
    fn default() -> Self {
        Self { parent: HashMap::new(), rank: HashMap::new() }
    }
}

impl<K: Copy + Eq + Hash> DisjointSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative of `key`'s set. Unknown keys are their own set.
    pub fn find(&self, key: K) -> K {
        let mut cur = key;
        while let Some(&p) = self.parent.get(&cur) {
            if p == cur {
                break;
            }
            cur = p;
        }
        cur
    }

    /// Merge the sets of `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: K, b: K) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let rank_a = self.rank.get(&ra).copied().unwrap_or(0);
        let rank_b = self.rank.get(&rb).copied().unwrap_or(0);
        let (root, child) = if rank_a >= rank_b { (ra, rb) } else { (rb, ra) };
        self.parent.insert(child, root);
        self.parent.entry(root).or_insert(root);
        if rank_a == rank_b {
            *self.rank.entry(root).or_insert(0) += 1;
        }
        // Flatten the path from the original keys.
        self.parent.insert(a, root);
        self.parent.insert(b, root);
        true
    }

    pub fn same(&self, a: K, b: K) -> bool {
        self.find(a) == self.find(b)
    }
}

/// Which rooms corridors have joined, directly and transitively.
#[derive(Clone, Debug, Default)]
pub struct RoomLinks {
    components: DisjointSet<RoomId>,
    edges: HashSet<(RoomId, RoomId)>,
}

impl RoomLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a corridor between `a` and `b`.
    pub fn link(&mut self, a: RoomId, b: RoomId) {
        self.edges.insert(edge_key(a, b));
        self.components.union(a, b);
    }

    /// A corridor joins `a` and `b` directly.
    pub fn linked(&self, a: RoomId, b: RoomId) -> bool {
        self.edges.contains(&edge_key(a, b))
    }

    /// `a` and `b` are reachable from each other through corridors.
    pub fn connected(&self, a: RoomId, b: RoomId) -> bool {
        a == b || self.components.same(a, b)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn edge_key(a: RoomId, b: RoomId) -> (RoomId, RoomId) {
    if a <= b { (a, b) } else { (b, a) }
}
