//! # Configuration Error Types
//!
//! Everything that can make a `GridParameters` unusable. These are fatal at
//! setup: streaming never starts with an invalid configuration.

use thiserror::Error;

use crate::math::Int3;

/// Errors that make a grid configuration invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The material table has no entries.
    #[error("material table is empty")]
    NoMaterials,

    /// The empty material index does not name a material.
    #[error("empty material index {index} out of range for {count} materials")]
    EmptyIndexOutOfRange {
        /// Configured empty index.
        index: u16,
        /// Number of materials in the table.
        count: usize,
    },

    /// The material table does not fit in a `u16` index.
    #[error("too many materials: {0} (max 65536)")]
    TooManyMaterials(usize),

    /// A chunk dimension is zero or negative.
    #[error("chunk size {0} must be positive on every axis")]
    NonPositiveChunkSize(Int3),

    /// The corner lattice of one chunk overflows 16-bit indices.
    #[error("chunk size {size} yields {corners} corner vertices (max 65536)")]
    TooManyCorners {
        /// Offending chunk size.
        size: Int3,
        /// `(sx+1)(sy+1)(sz+1)`.
        corners: i64,
    },

    /// World bounds are empty or inverted.
    #[error("world bounds {min}..{max} are empty")]
    EmptyWorldBounds {
        /// Minimum coordinate (inclusive).
        min: Int3,
        /// Maximum coordinate (exclusive).
        max: Int3,
    },

    /// Render distance must be positive.
    #[error("max render distance must be positive, got {0}")]
    NonPositiveRenderDistance(i32),

    /// Max height must not be negative.
    #[error("max height must not be negative, got {0}")]
    NegativeMaxHeight(i32),

    /// A grid's cell buffer does not match its padded dimensions.
    #[error("grid for chunk size {size} needs {expected} cells, got {actual}")]
    CellCountMismatch {
        /// Chunk size of the grid.
        size: Int3,
        /// `(sx+1)(sy+1)(sz+1)`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Config text failed to parse.
    #[error("failed to parse grid parameters: {0}")]
    Parse(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
