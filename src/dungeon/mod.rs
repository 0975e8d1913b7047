//! Dungeon layout: rooms, corridors, their connectivity and the registry that owns them

pub mod room;
pub mod corridor;
pub mod graph;
pub mod registry;

pub use room::{Room, RoomId};
pub use corridor::{Corridor, CorridorId, CorridorPlan, line_path};
pub use graph::{DisjointSet, RoomLinks};
pub use registry::DungeonRegistry;
