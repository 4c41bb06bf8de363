//! # Chunk Streamer
//!
//! Drives the resident set around a moving view. One `update` per host tick:
//!
//! 1. drain finished builds, publishing the ones whose ticket is current
//! 2. evict chunks whose anchor left the render cylinder
//! 3. admit chunks whose anchor entered it, sampling grid data as needed
//! 4. dispatch a build for every chunk flagged dirty
//!
//! Range is cylindrical: only X and Y count toward distance. Every Z layer
//! inside the world bounds is resident under an admitted column.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use voxstream_mesh::VisibilityClassifier;
use voxstream_procedural::TerrainSampler;
use voxstream_shared::{ChunkCoord, ConfigError, GridParameters, Int3, Vec3};

use crate::error::{StreamError, StreamResult};
use crate::render::RenderSink;
use crate::state::ChunkState;
use crate::store::{ChunkStore, DataCachePolicy};
use crate::worker::{MeshJob, MeshJobResult, MeshWorkerPool};

/// Upper limit on configured mesh workers.
pub const MAX_WORKER_THREADS: usize = 256;

/// Point of a chunk measured against the view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkAnchor {
    /// The chunk's minimum corner.
    MinCorner,
    /// Minimum corner plus half the chunk size.
    #[default]
    Center,
}

/// When a resident chunk is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Only after its own grid or a lower neighbour's grid arrives.
    #[default]
    OnDataChange,
    /// Every update, for every resident chunk in range.
    EveryUpdate,
}

/// Streamer settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Mesh worker threads. 0 builds inline on the updating thread.
    pub worker_threads: usize,
    /// Point of a chunk measured against the view.
    pub anchor: ChunkAnchor,
    /// When resident chunks are rebuilt.
    pub rebuild: RebuildPolicy,
    /// How long sampled grids stay cached.
    pub cache: DataCachePolicy,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        let worker_threads = std::thread::available_parallelism()
            .map_or(1, |n| n.get().saturating_sub(1).max(1));
        Self {
            worker_threads,
            anchor: ChunkAnchor::default(),
            rebuild: RebuildPolicy::default(),
            cache: DataCachePolicy::default(),
        }
    }
}

impl StreamerConfig {
    /// Inline builds, otherwise defaults. Deterministic scheduling for tests
    /// and tools.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            worker_threads: 0,
            ..Self::default()
        }
    }

    /// Parses settings from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Config` on malformed text and
    /// `StreamError::InvalidStreamerConfig` if the values are unusable.
    pub fn from_toml_str(text: &str) -> StreamResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::InvalidStreamerConfig` describing the first
    /// problem found.
    pub fn validate(&self) -> StreamResult<()> {
        if self.worker_threads > MAX_WORKER_THREADS {
            return Err(StreamError::InvalidStreamerConfig(format!(
                "worker_threads {} exceeds {MAX_WORKER_THREADS}",
                self.worker_threads
            )));
        }
        if let DataCachePolicy::Bounded { max_chunks: 0 } = self.cache {
            return Err(StreamError::InvalidStreamerConfig(
                "bounded cache needs max_chunks > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters since the streamer was created. The first three are gauges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks currently resident.
    pub resident_chunks: usize,
    /// Grids currently cached.
    pub cached_grids: usize,
    /// Resident chunks waiting on a build.
    pub pending_builds: usize,
    /// `update` calls.
    pub updates: u64,
    /// Chunks that became resident.
    pub admitted: u64,
    /// Chunks that left range.
    pub evicted: u64,
    /// Build jobs submitted.
    pub dispatched: u64,
    /// Builds accepted.
    pub built: u64,
    /// Builds dropped because their ticket was no longer current.
    pub discarded_stale: u64,
    /// Meshes handed to the sink.
    pub published: u64,
}

/// Index range of chunks that can be in range, max exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChunkBounds {
    min: Int3,
    max: Int3,
}

/// Keeps the chunks around a view resident and meshed.
pub struct ChunkStreamer<T: TerrainSampler, R: RenderSink> {
    params: Arc<GridParameters>,
    config: StreamerConfig,
    classifier: Arc<VisibilityClassifier>,
    sampler: T,
    sink: R,
    store: ChunkStore,
    pool: MeshWorkerPool,
    stats: StreamStats,
}

impl<T: TerrainSampler, R: RenderSink> ChunkStreamer<T, R> {
    /// Validates the configuration and starts the worker pool.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Config` for invalid grid parameters,
    /// `StreamError::InvalidStreamerConfig` for invalid settings and
    /// `StreamError::WorkerSpawn` if a worker cannot be started.
    pub fn new(params: GridParameters, config: StreamerConfig, sampler: T, sink: R) -> StreamResult<Self> {
        params.validate()?;
        config.validate()?;

        let params = Arc::new(params);
        let classifier = Arc::new(VisibilityClassifier::new(&params));
        let store = ChunkStore::new(Arc::clone(&params), config.cache);
        let pool = MeshWorkerPool::new(config.worker_threads)?;

        info!(
            chunk_size = %params.chunk_size,
            render_distance = params.max_render_distance,
            workers = config.worker_threads,
            "chunk streamer started"
        );

        Ok(Self {
            params,
            config,
            classifier,
            sampler,
            sink,
            store,
            pool,
            stats: StreamStats::default(),
        })
    }

    /// Session parameters.
    #[must_use]
    pub fn params(&self) -> &Arc<GridParameters> {
        &self.params
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Grid cache and chunk entries.
    #[must_use]
    pub const fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// The render collaborator.
    #[must_use]
    pub const fn sink(&self) -> &R {
        &self.sink
    }

    /// The render collaborator, mutably.
    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    /// Lifecycle state of `coord`.
    #[must_use]
    pub fn state(&self, coord: ChunkCoord) -> ChunkState {
        self.store.state(coord)
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            resident_chunks: self.store.resident_count(),
            cached_grids: self.store.data_count(),
            ..self.stats
        }
    }

    // =========================================================================
    // DRIVING
    // =========================================================================

    /// Advances streaming to `view`.
    pub fn update(&mut self, view: Vec3) {
        self.stats.updates += 1;
        self.drain_results();

        let bounds = self.chunk_bounds(view);
        let evicted = self.evict(view);
        let admitted = self.admit(view, bounds);
        let dispatched = self.dispatch();
        let dropped = self.store.enforce_cache_policy();

        self.drain_results();

        debug!(
            admitted,
            evicted,
            dispatched,
            dropped,
            resident = self.store.resident_count(),
            pending = self.stats.pending_builds,
            "stream update"
        );
    }

    /// Blocks until every pending build has been accepted and published.
    pub fn flush(&mut self) {
        while self.stats.pending_builds > 0 {
            let Some(result) = self.pool.recv() else {
                break;
            };
            self.accept(result);
        }
    }

    // =========================================================================
    // STEPS
    // =========================================================================

    fn drain_results(&mut self) {
        while let Some(result) = self.pool.try_recv() {
            self.accept(result);
        }
    }

    fn accept(&mut self, result: MeshJobResult) {
        let MeshJobResult {
            coord,
            ticket,
            mesh,
            elapsed,
        } = result;

        let mesh = mesh.map(Arc::new);
        match self.store.publish_mesh(coord, ticket, mesh.clone()) {
            Ok(replaced) => {
                self.stats.pending_builds = self.stats.pending_builds.saturating_sub(1);
                self.stats.built += 1;
                match mesh {
                    Some(mesh) => {
                        self.sink.publish(coord, coord.origin(self.params.chunk_size), &mesh);
                        self.stats.published += 1;
                    }
                    None if replaced.is_some() => self.sink.remove(coord),
                    None => {}
                }
                log_build(coord, elapsed);
            }
            Err(_) => {
                self.stats.discarded_stale += 1;
                debug!(%coord, ticket, "stale build discarded");
            }
        }
    }

    /// Chunk index range touched by the render box around `view`.
    fn chunk_bounds(&self, view: Vec3) -> ChunkBounds {
        let radius = Vec3::splat(self.params.max_render_distance as f32);
        let lo = Int3::floor(view - radius).clamp(self.params.min_coordinate, self.params.max_coordinate);
        let hi = Int3::ceil(view + radius).clamp(self.params.min_coordinate, self.params.max_coordinate);
        ChunkBounds {
            min: lo.div_floor(self.params.chunk_size),
            max: hi.div_ceil(self.params.chunk_size),
        }
    }

    fn in_range(&self, coord: ChunkCoord, view: Vec3) -> bool {
        let origin = coord.origin(self.params.chunk_size);
        let size = self.params.chunk_size;
        let (ax, ay) = match self.config.anchor {
            ChunkAnchor::MinCorner => (f64::from(origin.x), f64::from(origin.y)),
            ChunkAnchor::Center => (
                f64::from(origin.x) + f64::from(size.x) * 0.5,
                f64::from(origin.y) + f64::from(size.y) * 0.5,
            ),
        };
        let dx = ax - f64::from(view.x);
        let dy = ay - f64::from(view.y);
        (dx * dx + dy * dy) < self.params.render_distance_squared() as f64
    }

    fn evict(&mut self, view: Vec3) -> usize {
        let mut leaving: Vec<ChunkCoord> = self
            .store
            .resident_coords()
            .into_iter()
            .filter(|&coord| !self.in_range(coord, view))
            .collect();
        leaving.sort_unstable();

        for &coord in &leaving {
            let was_pending = self.store.state(coord) == ChunkState::MeshPending;
            let Some(entry) = self.store.remove_entry(coord) else {
                continue;
            };
            if entry.mesh.is_some() {
                self.sink.remove(coord);
            }
            if was_pending {
                self.stats.pending_builds = self.stats.pending_builds.saturating_sub(1);
            }
            self.stats.evicted += 1;
        }
        leaving.len()
    }

    fn admit(&mut self, view: Vec3, bounds: ChunkBounds) -> usize {
        let mut in_range = Vec::new();
        for x in bounds.min.x..bounds.max.x {
            for y in bounds.min.y..bounds.max.y {
                let column = ChunkCoord::new(x, y, 0);
                if !self.in_range(column, view) {
                    continue;
                }
                for z in bounds.min.z..bounds.max.z {
                    in_range.push(ChunkCoord::new(x, y, z));
                }
            }
        }

        // Grid data first, so new grids can flag the chunks that read them.
        for &coord in &in_range {
            if self.store.ensure_data(coord, &self.sampler) {
                for offset in UPPER_NEIGHBOUR_OFFSETS {
                    self.store.mark_dirty(coord.offset(offset));
                }
            }
        }

        let mut admitted = 0;
        for &coord in &in_range {
            if self.store.is_resident(coord) {
                if self.config.rebuild == RebuildPolicy::EveryUpdate {
                    self.store.mark_dirty(coord);
                }
                continue;
            }
            let entry = self.store.insert_entry(coord);
            entry.transition(ChunkState::DataReady);
            entry.dirty = true;
            admitted += 1;
        }
        self.stats.admitted += admitted as u64;
        admitted
    }

    fn dispatch(&mut self) -> usize {
        let mut dirty = self.store.dirty_coords();
        dirty.sort_unstable();

        let mut dispatched = 0;
        for coord in dirty {
            let Some(neighborhood) = self.store.neighborhood(coord) else {
                continue;
            };
            let was_pending = self.store.state(coord) == ChunkState::MeshPending;
            let Some(ticket) = self.store.issue_ticket(coord) else {
                continue;
            };
            if !was_pending {
                self.stats.pending_builds += 1;
            }
            self.pool.submit(MeshJob {
                coord,
                ticket,
                neighborhood,
                params: Arc::clone(&self.params),
                classifier: Arc::clone(&self.classifier),
            });
            dispatched += 1;
        }
        self.stats.dispatched += dispatched as u64;
        dispatched
    }
}

/// Chunks that read a chunk's grid as one of their lower neighbours.
const UPPER_NEIGHBOUR_OFFSETS: [Int3; 7] = [
    Int3::new(1, 0, 0),
    Int3::new(0, 1, 0),
    Int3::new(1, 1, 0),
    Int3::new(0, 0, 1),
    Int3::new(1, 0, 1),
    Int3::new(0, 1, 1),
    Int3::new(1, 1, 1),
];

fn log_build(coord: ChunkCoord, elapsed: Duration) {
    trace!(%coord, elapsed_us = elapsed.as_micros() as u64, "build accepted");
}
