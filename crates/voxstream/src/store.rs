//! # Chunk Store
//!
//! Owns two maps:
//!
//! - coordinate -> sampled grid (`Arc<VoxelGridData>`), behind a
//!   `parking_lot::RwLock` so lookups are safe from any thread
//! - coordinate -> [`ChunkEntry`] for resident chunks, touched only by the
//!   coordinating thread
//!
//! A grid is fully built before it is inserted and never changes after.
//! Workers never read the store directly; they get a [`ChunkNeighborhood`]
//! snapshot that owns the grids it needs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use voxstream_mesh::{MeshBuildResult, VoxelSource};
use voxstream_procedural::TerrainSampler;
use voxstream_shared::{ChunkCoord, GridParameters, Int3, VoxelGridData};

use crate::state::{ChunkEntry, ChunkState};

/// How long sampled grids stay cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataCachePolicy {
    /// Keep every grid ever sampled.
    #[default]
    Unbounded,
    /// Keep at most `max_chunks` grids, dropping the least recently used
    /// ones that no resident chunk owns. Resident grids are never dropped,
    /// so the cache may exceed the limit while many chunks are resident.
    Bounded {
        /// Soft cap on cached grids.
        max_chunks: usize,
    },
}

struct CachedGrid {
    grid: Arc<VoxelGridData>,
    last_used: AtomicU64,
}

/// Grid cache plus resident chunk entries.
pub struct ChunkStore {
    params: Arc<GridParameters>,
    policy: DataCachePolicy,
    data: RwLock<HashMap<ChunkCoord, CachedGrid>>,
    /// LRU clock, bumped on every data access.
    clock: AtomicU64,
    entries: HashMap<ChunkCoord, ChunkEntry>,
    next_ticket: u64,
}

impl ChunkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(params: Arc<GridParameters>, policy: DataCachePolicy) -> Self {
        Self {
            params,
            policy,
            data: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            entries: HashMap::new(),
            next_ticket: 1,
        }
    }

    /// Session parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &Arc<GridParameters> {
        &self.params
    }

    /// Cache policy in effect.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> DataCachePolicy {
        self.policy
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    // =========================================================================
    // GRID DATA
    // =========================================================================

    /// Returns the grid for `coord`, sampling and caching it first if needed.
    ///
    /// Idempotent: a cached grid is never resampled.
    pub fn get_or_create_data(&self, coord: ChunkCoord, sampler: &dyn TerrainSampler) -> Arc<VoxelGridData> {
        self.fetch_or_sample(coord, sampler).0
    }

    /// Makes sure `coord` has a grid. Returns true if it had to be sampled.
    pub fn ensure_data(&self, coord: ChunkCoord, sampler: &dyn TerrainSampler) -> bool {
        self.fetch_or_sample(coord, sampler).1
    }

    fn fetch_or_sample(&self, coord: ChunkCoord, sampler: &dyn TerrainSampler) -> (Arc<VoxelGridData>, bool) {
        if let Some(grid) = self.data(coord) {
            return (grid, false);
        }

        // Sample outside the lock; only the grid that wins the insert is
        // ever visible.
        let grid = Arc::new(sampler.sample(coord, &self.params));
        let now = self.tick();
        let mut data = self.data.write();
        let cached = data.entry(coord).or_insert_with(|| CachedGrid {
            grid,
            last_used: AtomicU64::new(now),
        });
        trace!(%coord, "grid cached");
        (Arc::clone(&cached.grid), true)
    }

    /// Cached grid for `coord`, if any.
    #[must_use]
    pub fn data(&self, coord: ChunkCoord) -> Option<Arc<VoxelGridData>> {
        let data = self.data.read();
        data.get(&coord).map(|cached| {
            cached.last_used.store(self.tick(), Ordering::Relaxed);
            Arc::clone(&cached.grid)
        })
    }

    /// Inserts a pre-built grid, replacing any cached one.
    pub fn insert_data(&self, grid: VoxelGridData) {
        let coord = grid.coord();
        let now = self.tick();
        self.data.write().insert(
            coord,
            CachedGrid {
                grid: Arc::new(grid),
                last_used: AtomicU64::new(now),
            },
        );
    }

    /// True if `coord` has a cached grid.
    #[must_use]
    pub fn contains_data(&self, coord: ChunkCoord) -> bool {
        self.data.read().contains_key(&coord)
    }

    /// Number of cached grids.
    #[must_use]
    pub fn data_count(&self) -> usize {
        self.data.read().len()
    }

    /// Material index at a world voxel.
    ///
    /// Returns the empty material index outside the world bounds or when
    /// the owning chunk has no grid yet.
    #[must_use]
    pub fn material_index(&self, world_voxel: Int3) -> u16 {
        let empty = self.params.empty_material_index;
        if !self.params.in_world(world_voxel) {
            return empty;
        }
        let owner = ChunkCoord::containing(world_voxel, self.params.chunk_size);
        self.data
            .read()
            .get(&owner)
            .and_then(|cached| cached.grid.get_world(world_voxel))
            .unwrap_or(empty)
    }

    /// Snapshot of `coord`'s grid and its seven lower neighbours.
    ///
    /// Returns `None` if `coord` itself has no grid. Missing neighbours read
    /// as empty.
    #[must_use]
    pub fn neighborhood(&self, coord: ChunkCoord) -> Option<ChunkNeighborhood> {
        let data = self.data.read();
        let centre = data.get(&coord)?;
        let mut grids: [Option<Arc<VoxelGridData>>; 8] = Default::default();
        grids[ChunkNeighborhood::CENTRE] = Some(Arc::clone(&centre.grid));
        for (slot, grid) in grids.iter_mut().enumerate().take(ChunkNeighborhood::CENTRE) {
            let neighbour = coord.offset(ChunkNeighborhood::slot_offset(slot));
            *grid = data.get(&neighbour).map(|cached| Arc::clone(&cached.grid));
        }
        Some(ChunkNeighborhood {
            coord,
            chunk_size: self.params.chunk_size,
            min_coordinate: self.params.min_coordinate,
            max_coordinate: self.params.max_coordinate,
            empty_index: self.params.empty_material_index,
            grids,
        })
    }

    /// Applies the cache policy. Returns how many grids were dropped.
    pub fn enforce_cache_policy(&self) -> usize {
        let DataCachePolicy::Bounded { max_chunks } = self.policy else {
            return 0;
        };
        let mut data = self.data.write();
        if data.len() <= max_chunks {
            return 0;
        }

        let mut candidates: Vec<(u64, ChunkCoord)> = data
            .iter()
            .filter(|(coord, _)| !self.entries.contains_key(*coord))
            .map(|(coord, cached)| (cached.last_used.load(Ordering::Relaxed), *coord))
            .collect();
        candidates.sort_unstable_by_key(|&(last_used, _)| last_used);

        let excess = data.len() - max_chunks;
        let mut dropped = 0;
        for (_, coord) in candidates.into_iter().take(excess) {
            data.remove(&coord);
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, cached = data.len(), "grid cache trimmed");
        }
        dropped
    }

    // =========================================================================
    // RESIDENT ENTRIES
    // =========================================================================

    /// Entry of a resident chunk.
    #[must_use]
    pub fn entry(&self, coord: ChunkCoord) -> Option<&ChunkEntry> {
        self.entries.get(&coord)
    }

    /// Lifecycle state of `coord` (`Absent` if not resident).
    #[must_use]
    pub fn state(&self, coord: ChunkCoord) -> ChunkState {
        self.entries.get(&coord).map_or(ChunkState::Absent, |e| e.state)
    }

    /// Starts tracking `coord`. Returns the existing entry if already resident.
    pub fn insert_entry(&mut self, coord: ChunkCoord) -> &mut ChunkEntry {
        self.entries.entry(coord).or_insert_with(|| ChunkEntry {
            state: ChunkState::DataPending,
            ..ChunkEntry::default()
        })
    }

    /// Stops tracking `coord`. The returned entry is in state `Removed`.
    pub fn remove_entry(&mut self, coord: ChunkCoord) -> Option<ChunkEntry> {
        let mut entry = self.entries.remove(&coord)?;
        entry.transition(ChunkState::Removed);
        Some(entry)
    }

    /// True if `coord` is resident.
    #[must_use]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.entries.len()
    }

    /// Coordinates of every resident chunk.
    #[must_use]
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        self.entries.keys().copied().collect()
    }

    /// Coordinates of resident chunks flagged for a build.
    #[must_use]
    pub fn dirty_coords(&self) -> Vec<ChunkCoord> {
        self.entries
            .iter()
            .filter(|(_, e)| e.dirty)
            .map(|(coord, _)| *coord)
            .collect()
    }

    /// Flags `coord` for a build if it is resident.
    pub fn mark_dirty(&mut self, coord: ChunkCoord) -> bool {
        match self.entries.get_mut(&coord) {
            Some(entry) => {
                entry.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Gives `coord` a fresh build ticket and moves it to `MeshPending`.
    ///
    /// Any result carrying an earlier ticket becomes stale. Returns `None`
    /// if `coord` is not resident or not ready for a build.
    pub fn issue_ticket(&mut self, coord: ChunkCoord) -> Option<u64> {
        let entry = self.entries.get_mut(&coord)?;
        if !entry.transition(ChunkState::MeshPending) {
            return None;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        entry.ticket = ticket;
        entry.dirty = false;
        Some(ticket)
    }

    /// True if `ticket` is the build `coord` is currently waiting for.
    #[must_use]
    pub fn is_current(&self, coord: ChunkCoord, ticket: u64) -> bool {
        self.entries
            .get(&coord)
            .is_some_and(|e| e.state == ChunkState::MeshPending && e.ticket == ticket)
    }

    /// Stores an accepted build and moves `coord` to `MeshActive`.
    ///
    /// Returns the mesh it replaced. Does nothing if `ticket` is stale.
    pub fn publish_mesh(
        &mut self,
        coord: ChunkCoord,
        ticket: u64,
        mesh: Option<Arc<MeshBuildResult>>,
    ) -> Result<Option<Arc<MeshBuildResult>>, Option<Arc<MeshBuildResult>>> {
        if !self.is_current(coord, ticket) {
            return Err(mesh);
        }
        let Some(entry) = self.entries.get_mut(&coord) else {
            return Err(mesh);
        };
        entry.transition(ChunkState::MeshActive);
        Ok(std::mem::replace(&mut entry.mesh, mesh))
    }
}

/// Immutable view of a chunk and its seven lower neighbours.
///
/// Extraction reads one cell below the chunk on each axis, which lives in a
/// neighbour's storage. Everything above is covered by the chunk's own
/// padding.
#[derive(Clone, Debug)]
pub struct ChunkNeighborhood {
    coord: ChunkCoord,
    chunk_size: Int3,
    min_coordinate: Int3,
    max_coordinate: Int3,
    empty_index: u16,
    /// Slot `i` holds chunk `coord + ((i>>2)&1, (i>>1)&1, i&1) - 1`.
    grids: [Option<Arc<VoxelGridData>>; 8],
}

impl ChunkNeighborhood {
    const CENTRE: usize = 7;

    fn slot_offset(slot: usize) -> Int3 {
        Int3::new(
            ((slot >> 2) & 1) as i32 - 1,
            ((slot >> 1) & 1) as i32 - 1,
            (slot & 1) as i32 - 1,
        )
    }

    /// Chunk this snapshot was taken for.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// The centre chunk's grid.
    #[must_use]
    pub fn centre(&self) -> Option<&Arc<VoxelGridData>> {
        self.grids[Self::CENTRE].as_ref()
    }

    /// Number of lower neighbours that had data.
    #[must_use]
    pub fn neighbour_count(&self) -> usize {
        self.grids[..Self::CENTRE].iter().flatten().count()
    }
}

impl VoxelSource for ChunkNeighborhood {
    fn material_index(&self, world_voxel: Int3) -> u16 {
        if !(self.min_coordinate.all_le(world_voxel) && world_voxel.all_lt(self.max_coordinate)) {
            return self.empty_index;
        }
        let local = world_voxel - self.coord.origin(self.chunk_size);
        if !(Int3::splat(-1).all_le(local) && local.all_le(self.chunk_size)) {
            return self.empty_index;
        }
        // -1 on an axis means the lower neighbour on that axis; its padding
        // covers `size` on the other axes.
        let slot = (usize::from(local.x >= 0) << 2) | (usize::from(local.y >= 0) << 1) | usize::from(local.z >= 0);
        self.grids[slot]
            .as_ref()
            .and_then(|grid| grid.get_world(world_voxel))
            .unwrap_or(self.empty_index)
    }
}
