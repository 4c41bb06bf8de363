//! # VOXSTREAM Mesh
//!
//! Surface extraction for corner-padded voxel grids.
//!
//! ## Output
//!
//! One [`MeshBuildResult`] per chunk: corner-lattice vertices in chunk-local
//! voxel units, a 16-bit triangle list and one [`DrawElement`] per
//! (material, face direction) batch. Nothing here touches a GPU; the render
//! collaborator uploads the buffers it is handed.
//!
//! ## Example
//!
//! ```rust,ignore
//! let classifier = VisibilityClassifier::new(&params);
//! let mut extractor = VoxelMeshExtractor::new();
//! if let Some(mesh) = extractor.extract_grid(&grid, &params, &classifier) {
//!     upload(mesh.vertex_bytes(), mesh.index_bytes());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod extractor;
pub mod face;
pub mod mesh;
pub mod source;
pub mod visibility;

pub use extractor::{VoxelMeshExtractor, SLOW_BUILD_THRESHOLD};
pub use face::{corner_offset, FaceDirection};
pub use mesh::{DrawElement, GridVertex, MeshBuildResult};
pub use source::{GridSource, UniformSource, VoxelSource};
pub use visibility::{VisibilityClass, VisibilityClassifier};
