//! Chunk lifecycle.
//!
//! ```text
//! Absent -> DataPending -> DataReady -> MeshPending -> MeshActive
//!                                           ^              |
//!                                           +-- rebuild ---+
//! any resident state -> Removed
//! ```

use std::sync::Arc;

use voxstream_mesh::MeshBuildResult;

/// Where a chunk is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Not tracked.
    #[default]
    Absent,
    /// Entered range, grid not yet sampled.
    DataPending,
    /// Grid sampled, no build requested yet.
    DataReady,
    /// A build is in flight.
    MeshPending,
    /// The latest accepted build has been handed to the renderer.
    MeshActive,
    /// Left range. Terminal.
    Removed,
}

impl ChunkState {
    /// True for every state between admission and removal.
    #[inline]
    #[must_use]
    pub const fn is_resident(self) -> bool {
        !matches!(self, Self::Absent | Self::Removed)
    }

    /// True if moving to `next` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Absent, Self::DataPending)
            | (Self::DataPending, Self::DataReady)
            | (Self::DataReady | Self::MeshActive | Self::MeshPending, Self::MeshPending)
            | (Self::MeshPending, Self::MeshActive) => true,
            (from, Self::Removed) => from.is_resident(),
            _ => false,
        }
    }
}

/// Per-chunk bookkeeping owned by the store.
#[derive(Clone, Debug, Default)]
pub struct ChunkEntry {
    /// Lifecycle state.
    pub state: ChunkState,
    /// Ticket of the build currently awaited. Results carrying any other
    /// ticket are stale.
    pub ticket: u64,
    /// Needs a build on the next dispatch.
    pub dirty: bool,
    /// Latest published mesh, `None` if the chunk had nothing to draw.
    pub mesh: Option<Arc<MeshBuildResult>>,
}

impl ChunkEntry {
    /// Moves to `next`, returning false (and staying put) if that step is
    /// not part of the lifecycle.
    pub fn transition(&mut self, next: ChunkState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }
}
