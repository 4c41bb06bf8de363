//! # VOXSTREAM Procedural
//!
//! Deterministic terrain for chunk streaming.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same grid
//! 2. **Pure**: Samplers hold no mutable state and are `Send + Sync`
//! 3. **Padded**: Each grid carries one extra cell per axis so meshing
//!    never has to look into a neighbour for the upper faces
//!
//! ## Example
//!
//! ```rust,ignore
//! use voxstream_procedural::{FractalParams, HeightmapSampler, NoiseSeed, TerrainSampler};
//!
//! let sampler = HeightmapSampler::fractal(NoiseSeed::new(12345), FractalParams::default());
//! let grid = sampler.sample(ChunkCoord::new(0, 0, 0), &params);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod height;
pub mod noise;
pub mod sampler;

pub use height::{column_height, ConstantHeight, FractalHeightField, HeightField};
pub use noise::{FractalParams, NoiseSeed, SimplexNoise};
pub use sampler::{HeightmapSampler, TerrainSampler};
