//! # Streaming Error Types
//!
//! All of these surface while building a streamer. Once `update` is
//! running nothing fails: lookups that miss resolve to empty and a lost
//! build is simply requested again.

use thiserror::Error;
use voxstream_shared::ConfigError;

/// Errors from streamer setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Grid parameters failed validation.
    #[error("invalid grid parameters: {0}")]
    Config(#[from] ConfigError),

    /// Streamer settings are unusable.
    #[error("invalid streamer config: {0}")]
    InvalidStreamerConfig(String),

    /// A mesh worker thread could not be started.
    #[error("failed to spawn mesh worker {index}: {reason}")]
    WorkerSpawn {
        /// Worker number.
        index: usize,
        /// OS error text.
        reason: String,
    },
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
