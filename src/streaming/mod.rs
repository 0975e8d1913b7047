//! Chunk streaming around a moving viewer

pub mod priority;
pub mod cache;
pub mod pool;
pub mod budget;
pub mod scheduler;

pub use priority::{GenerationJob, JobQueue, priority_for_distance};
pub use cache::{ChunkCache, ChunkRecord};
pub use pool::{ChunkContainer, ChunkPool};
pub use budget::TickBudget;
pub use scheduler::{ChunkScheduler, ChunkState, SchedulerStats, TickReport};
