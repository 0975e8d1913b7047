//! Delve - streamed procedural voxel dungeons

pub mod core;
pub mod math;
pub mod voxel;
pub mod generation;
pub mod dungeon;
pub mod lighting;
pub mod streaming;
