//! # VOXSTREAM
//!
//! Streams a voxel world around a moving view and meshes what is resident.
//!
//! ## Architecture
//!
//! ```text
//! update(view) ──► ChunkStore ──► TerrainSampler      (coordinating thread)
//!       │              │
//!       │              └─► ChunkNeighborhood snapshot
//!       ▼                          │
//! MeshWorkerPool ◄── MeshJob ◄─────┘
//!       │  (N workers, one extractor each)
//!       ▼
//! MeshJobResult ──► ticket check ──► RenderSink::publish
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use voxstream::{ChunkStreamer, MeshRegistry, StreamerConfig};
//! use voxstream_procedural::{FractalParams, HeightmapSampler, NoiseSeed};
//! use voxstream_shared::{GridParameters, Vec3};
//!
//! let sampler = HeightmapSampler::fractal(NoiseSeed::new(7), FractalParams::default());
//! let mut streamer = ChunkStreamer::new(
//!     GridParameters::terrain_default(),
//!     StreamerConfig::default(),
//!     sampler,
//!     MeshRegistry::new(),
//! )?;
//!
//! streamer.update(Vec3::new(0.0, 0.0, 32.0));
//! streamer.flush();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod render;
pub mod state;
pub mod store;
pub mod streamer;
pub mod worker;

pub use error::{StreamError, StreamResult};
pub use render::{MeshRegistry, NullSink, RenderSink};
pub use state::{ChunkEntry, ChunkState};
pub use store::{ChunkNeighborhood, ChunkStore, DataCachePolicy};
pub use streamer::{
    ChunkAnchor, ChunkStreamer, RebuildPolicy, StreamStats, StreamerConfig, MAX_WORKER_THREADS,
};
pub use worker::{MeshJob, MeshJobResult, MeshWorkerPool};
