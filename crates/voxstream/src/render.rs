//! # Render Collaborator
//!
//! The streamer hands finished meshes across this seam and nothing else.
//! Uploading buffers, registering draw calls and tearing them down are the
//! sink's job.

use std::collections::HashMap;
use std::sync::Arc;

use voxstream_mesh::MeshBuildResult;
use voxstream_shared::{ChunkCoord, Int3};

/// Receives mesh updates from the streamer.
pub trait RenderSink {
    /// A chunk has a new mesh. `origin` is the world voxel position its
    /// vertices are relative to. Replaces any earlier mesh for `coord`.
    fn publish(&mut self, coord: ChunkCoord, origin: Int3, mesh: &Arc<MeshBuildResult>);

    /// A chunk's mesh is gone (evicted, or rebuilt to nothing).
    fn remove(&mut self, coord: ChunkCoord);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn publish(&mut self, _coord: ChunkCoord, _origin: Int3, _mesh: &Arc<MeshBuildResult>) {}

    fn remove(&mut self, _coord: ChunkCoord) {}
}

/// Keeps the latest mesh per chunk in memory.
///
/// Stands in for a scene in headless hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct MeshRegistry {
    meshes: HashMap<ChunkCoord, (Int3, Arc<MeshBuildResult>)>,
    publishes: u64,
    removals: u64,
}

impl MeshRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh currently shown for `coord`.
    #[must_use]
    pub fn mesh(&self, coord: ChunkCoord) -> Option<&Arc<MeshBuildResult>> {
        self.meshes.get(&coord).map(|(_, mesh)| mesh)
    }

    /// World origin the mesh for `coord` was published with.
    #[must_use]
    pub fn origin(&self, coord: ChunkCoord) -> Option<Int3> {
        self.meshes.get(&coord).map(|(origin, _)| *origin)
    }

    /// Chunks with a mesh.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.meshes.keys().copied()
    }

    /// Number of chunks with a mesh.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// True if nothing is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total `publish` calls received.
    #[must_use]
    pub const fn publish_count(&self) -> u64 {
        self.publishes
    }

    /// Total `remove` calls received.
    #[must_use]
    pub const fn removal_count(&self) -> u64 {
        self.removals
    }

    /// Triangles across every shown mesh.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.meshes.values().map(|(_, mesh)| mesh.triangle_count()).sum()
    }
}

impl RenderSink for MeshRegistry {
    fn publish(&mut self, coord: ChunkCoord, origin: Int3, mesh: &Arc<MeshBuildResult>) {
        self.publishes += 1;
        self.meshes.insert(coord, (origin, Arc::clone(mesh)));
    }

    fn remove(&mut self, coord: ChunkCoord) {
        self.removals += 1;
        self.meshes.remove(&coord);
    }
}
