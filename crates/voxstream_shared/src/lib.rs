//! # VOXSTREAM Shared
//!
//! Types every VOXSTREAM crate speaks: grid math, the session
//! configuration and the corner-padded voxel grid.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on threads, noise or meshing. If a type
//! needs any of those, it belongs in a higher crate.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod grid;
pub mod math;
pub mod params;

pub use error::{ConfigError, ConfigResult};
pub use grid::VoxelGridData;
pub use math::{ceil_div, floor_div, ChunkCoord, Int3, Vec3};
pub use params::{BlendMode, GridParameters, MaterialDef, SurfaceMaterialId, MAX_CHUNK_CORNERS};
