//! Error types for the Delve generator

use thiserror::Error;

use crate::voxel::chunk::ChunkCoord;

/// Main error type for the generator
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Generation error at {coord:?}: {reason}")]
    Generation { coord: ChunkCoord, reason: String },

    #[error("Chunk pool exhausted ({capacity} containers in use)")]
    PoolExhausted { capacity: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a generation failure at `coord`.
    pub fn generation(coord: ChunkCoord, reason: impl Into<String>) -> Self {
        Self::Generation { coord, reason: reason.into() }
    }
}
