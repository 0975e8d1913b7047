//! Dungeon registry: every room and corridor ever committed, plus a spatial
//! index from chunk coordinate to the entities overlapping that chunk.
//!
//! Entities live for the whole process. Two chunk indexes are kept: a live
//! one that unloading drops entries from (`prune`), and a permanent one that
//! `restore_index` copies back from and that overlap queries read, so lookups
//! cost the chunks a box spans rather than the whole registry.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::dungeon::corridor::{Corridor, CorridorId, CorridorPlan};
use crate::dungeon::graph::RoomLinks;
use crate::dungeon::room::{Room, RoomId};
use crate::math::GridAabb;
use crate::voxel::chunk::{ChunkCoord, ChunkDims};

/// Identifier-keyed store of rooms and corridors.
///
/// Single writer: every mutation takes `&mut self`.
pub struct DungeonRegistry {
    dims: ChunkDims,
    rooms: BTreeMap<RoomId, Room>,
    corridors: BTreeMap<CorridorId, Corridor>,
    room_index: HashMap<ChunkCoord, BTreeSet<RoomId>>,
    corridor_index: HashMap<ChunkCoord, BTreeSet<CorridorId>>,
    /// Never pruned.
    room_chunks: HashMap<ChunkCoord, BTreeSet<RoomId>>,
    corridor_chunks: HashMap<ChunkCoord, BTreeSet<CorridorId>>,
    next_room: u32,
    next_corridor: u32,
    /// Chunks whose terrain has been through room extraction.
    processed: HashSet<ChunkCoord>,
    /// Rooms not yet handed to the corridor connector.
    pending: BTreeSet<RoomId>,
    links: RoomLinks,
}

impl DungeonRegistry {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            rooms: BTreeMap::new(),
            corridors: BTreeMap::new(),
            room_index: HashMap::new(),
            corridor_index: HashMap::new(),
            room_chunks: HashMap::new(),
            corridor_chunks: HashMap::new(),
            next_room: 1,
            next_corridor: 1,
            processed: HashSet::new(),
            pending: BTreeSet::new(),
            links: RoomLinks::new(),
        }
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Commit a room unless it overlaps a registered one.
    ///
    /// The overlap test reads the permanent index, so a pruned chunk can
    /// never hide a conflict.
    pub fn register_room(&mut self, bounds: GridAabb) -> Option<RoomId> {
        if self.overlaps_room(&bounds) {
            log::debug!("Rejected overlapping room {:?}..{:?}", bounds.min, bounds.max);
            return None;
        }

        let id = RoomId(self.next_room);
        self.next_room += 1;

        let room = Room::new(id, bounds, self.dims);
        for &coord in &room.occupied_chunks {
            self.room_index.entry(coord).or_default().insert(id);
            self.room_chunks.entry(coord).or_default().insert(id);
        }
        self.rooms.insert(id, room);
        self.pending.insert(id);
        Some(id)
    }

    /// Commit a corridor and link its rooms. Never rejected.
    pub fn register_corridor(&mut self, plan: CorridorPlan) -> CorridorId {
        let id = CorridorId(self.next_corridor);
        self.next_corridor += 1;

        let corridor = Corridor::new(id, plan, self.dims);
        for &coord in &corridor.affected_chunks {
            self.corridor_index.entry(coord).or_default().insert(id);
            self.corridor_chunks.entry(coord).or_default().insert(id);
        }
        self.links.link(corridor.room_a, corridor.room_b);
        self.corridors.insert(id, corridor);
        id
    }

    /// Whether `bounds` intersects any registered room.
    pub fn overlaps_room(&self, bounds: &GridAabb) -> bool {
        !self.rooms_within(bounds).is_empty()
    }

    /// Rooms intersecting `area`, loaded or not, in id order.
    pub fn rooms_within(&self, area: &GridAabb) -> Vec<&Room> {
        let mut ids = BTreeSet::new();
        for coord in ChunkCoord::span(*area, self.dims) {
            if let Some(set) = self.room_chunks.get(&coord) {
                ids.extend(set.iter().copied());
            }
        }
        ids.iter()
            .filter_map(|id| self.rooms.get(id))
            .filter(|r| r.bounds.intersects(area))
            .collect()
    }

    /// Rooms indexed at `coord`, in id order.
    pub fn rooms_touching(&self, coord: ChunkCoord) -> Vec<&Room> {
        self.room_index
            .get(&coord)
            .map(|ids| ids.iter().filter_map(|id| self.rooms.get(id)).collect())
            .unwrap_or_default()
    }

    /// Corridors indexed at `coord`, in id order.
    pub fn corridors_touching(&self, coord: ChunkCoord) -> Vec<&Corridor> {
        self.corridor_index
            .get(&coord)
            .map(|ids| ids.iter().filter_map(|id| self.corridors.get(id)).collect())
            .unwrap_or_default()
    }

    /// Rooms indexed anywhere within Chebyshev `radius` of `center`, deduplicated, in id order.
    pub fn rooms_near(&self, center: ChunkCoord, radius: i32) -> Vec<&Room> {
        let mut ids = BTreeSet::new();
        for coord in center.within_radius(radius) {
            if let Some(set) = self.room_index.get(&coord) {
                ids.extend(set.iter().copied());
            }
        }
        ids.iter().filter_map(|id| self.rooms.get(id)).collect()
    }

    /// Drop the index entries for `coord`. Entities are kept.
    pub fn prune(&mut self, coord: ChunkCoord) {
        self.room_index.remove(&coord);
        self.corridor_index.remove(&coord);
    }

    /// Bring back the index entries `prune` dropped for `coord`.
    pub fn restore_index(&mut self, coord: ChunkCoord) {
        if let Some(rooms) = self.room_chunks.get(&coord) {
            self.room_index.insert(coord, rooms.clone());
        }
        if let Some(corridors) = self.corridor_chunks.get(&coord) {
            self.corridor_index.insert(coord, corridors.clone());
        }
    }

    pub fn is_indexed(&self, coord: ChunkCoord) -> bool {
        self.room_index.contains_key(&coord) || self.corridor_index.contains_key(&coord)
    }

    pub fn mark_processed(&mut self, coord: ChunkCoord) {
        self.processed.insert(coord);
    }

    pub fn is_processed(&self, coord: ChunkCoord) -> bool {
        self.processed.contains(&coord)
    }

    pub fn is_pending(&self, id: RoomId) -> bool {
        self.pending.contains(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Mark rooms as seen by the connector.
    pub fn clear_pending(&mut self, ids: impl IntoIterator<Item = RoomId>) {
        for id in ids {
            self.pending.remove(&id);
        }
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn corridor(&self, id: CorridorId) -> Option<&Corridor> {
        self.corridors.get(&id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn corridors(&self) -> impl Iterator<Item = &Corridor> {
        self.corridors.values()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn corridor_count(&self) -> usize {
        self.corridors.len()
    }

    pub fn links(&self) -> &RoomLinks {
        &self.links
    }
}
