//! # Mesh Worker Pool
//!
//! N `std::thread` workers pull jobs from one `crossbeam-channel` queue and
//! push results onto another. Each worker keeps its own extractor so
//! scratch buffers are reused across builds.
//!
//! With zero workers the pool builds inline on the submitting thread and
//! queues the result like a worker would.
//!
//! Dropping the pool closes the job queue; workers finish what is queued
//! and exit, and the drop joins them.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};
use voxstream_mesh::{MeshBuildResult, VisibilityClassifier, VoxelMeshExtractor};
use voxstream_shared::{ChunkCoord, GridParameters};

use crate::error::{StreamError, StreamResult};
use crate::store::ChunkNeighborhood;

/// One build request. Owns everything the build reads.
pub struct MeshJob {
    /// Chunk to build.
    pub coord: ChunkCoord,
    /// Ticket the result must carry to be accepted.
    pub ticket: u64,
    /// Grid snapshot.
    pub neighborhood: ChunkNeighborhood,
    /// Session parameters.
    pub params: Arc<GridParameters>,
    /// Session classifier.
    pub classifier: Arc<VisibilityClassifier>,
}

impl MeshJob {
    fn run(self, extractor: &mut VoxelMeshExtractor) -> MeshJobResult {
        let start = Instant::now();
        let mesh = extractor.extract(&self.neighborhood, self.coord, &self.params, &self.classifier);
        MeshJobResult {
            coord: self.coord,
            ticket: self.ticket,
            mesh,
            elapsed: start.elapsed(),
        }
    }
}

/// A finished build.
#[derive(Debug)]
pub struct MeshJobResult {
    /// Chunk that was built.
    pub coord: ChunkCoord,
    /// Ticket of the job.
    pub ticket: u64,
    /// `None` if the chunk has nothing visible.
    pub mesh: Option<MeshBuildResult>,
    /// Build time.
    pub elapsed: Duration,
}

/// Worker threads plus their queues.
pub struct MeshWorkerPool {
    jobs: Option<Sender<MeshJob>>,
    results: Receiver<MeshJobResult>,
    /// Only set in inline mode; workers own the other senders.
    inline: Option<(Sender<MeshJobResult>, VoxelMeshExtractor)>,
    workers: Vec<JoinHandle<()>>,
}

impl MeshWorkerPool {
    /// Starts `threads` workers (0 = build inline).
    ///
    /// # Errors
    ///
    /// Returns `StreamError::WorkerSpawn` if the OS refuses a thread. Any
    /// workers already started are shut down.
    pub fn new(threads: usize) -> StreamResult<Self> {
        let (job_tx, job_rx) = unbounded::<MeshJob>();
        let (result_tx, result_rx) = unbounded::<MeshJobResult>();

        let mut pool = Self {
            jobs: Some(job_tx),
            results: result_rx,
            inline: None,
            workers: Vec::with_capacity(threads),
        };

        if threads == 0 {
            pool.inline = Some((result_tx, VoxelMeshExtractor::new()));
            info!("mesh builds run inline");
            return Ok(pool);
        }

        for index in 0..threads {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("voxstream-mesh-{index}"))
                .spawn(move || Self::worker_loop(&jobs, &results))
                .map_err(|e| StreamError::WorkerSpawn {
                    index,
                    reason: e.to_string(),
                })?;
            pool.workers.push(handle);
        }
        info!(workers = threads, "mesh worker pool started");
        Ok(pool)
    }

    fn worker_loop(jobs: &Receiver<MeshJob>, results: &Sender<MeshJobResult>) {
        let mut extractor = VoxelMeshExtractor::new();
        for job in jobs {
            if results.send(job.run(&mut extractor)).is_err() {
                break;
            }
        }
    }

    /// Number of worker threads (0 in inline mode).
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a build. In inline mode the build runs before this returns.
    pub fn submit(&mut self, job: MeshJob) {
        if let Some((results, extractor)) = self.inline.as_mut() {
            let _ = results.send(job.run(extractor));
            return;
        }
        let Some(jobs) = self.jobs.as_ref() else {
            return;
        };
        if let Err(returned) = jobs.send(job) {
            // Every worker is gone. Build here rather than lose the chunk.
            warn!("mesh workers disconnected, building inline");
            self.switch_to_inline();
            self.submit(returned.into_inner());
        }
    }

    /// Replaces the result queue with one fed inline, carrying over results
    /// the workers finished before they went away.
    fn switch_to_inline(&mut self) {
        let (tx, rx) = unbounded();
        for finished in self.results.try_iter() {
            let _ = tx.send(finished);
        }
        self.results = rx;
        self.inline = Some((tx, VoxelMeshExtractor::new()));
    }

    /// Next finished build, if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<MeshJobResult> {
        self.results.try_recv().ok()
    }

    /// Blocks until a build finishes. `None` if no build can ever arrive.
    #[must_use]
    pub fn recv(&self) -> Option<MeshJobResult> {
        self.results.recv().ok()
    }
}

impl Drop for MeshWorkerPool {
    fn drop(&mut self) {
        // Closing the queue ends each worker's loop.
        self.jobs.take();
        let workers = self.workers.len();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        if workers > 0 {
            info!(workers, "mesh worker pool stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChunkStore, DataCachePolicy};
    use voxstream_shared::{Int3, VoxelGridData};

    fn job_for(coord: ChunkCoord, ticket: u64) -> MeshJob {
        let params = Arc::new(GridParameters::terrain_default().with_chunk_size(Int3::splat(4)));
        let store = ChunkStore::new(Arc::clone(&params), DataCachePolicy::Unbounded);
        store.insert_data(VoxelGridData::from_fn(coord, params.chunk_size, |p| u16::from(p.z < 2)));
        MeshJob {
            coord,
            ticket,
            neighborhood: store.neighborhood(coord).expect("inserted"),
            classifier: Arc::new(VisibilityClassifier::new(&params)),
            params,
        }
    }

    #[test]
    fn test_inline_pool_builds_on_submit() {
        let mut pool = MeshWorkerPool::new(0).expect("inline pool");
        assert_eq!(pool.worker_count(), 0);
        pool.submit(job_for(ChunkCoord::new(0, 0, 0), 7));

        let result = pool.try_recv().expect("built during submit");
        assert_eq!(result.ticket, 7);
        assert!(result.mesh.is_some());
        assert!(pool.try_recv().is_none());
    }

    #[test]
    fn test_threaded_pool_returns_every_result() {
        let mut pool = MeshWorkerPool::new(3).expect("spawn workers");
        assert_eq!(pool.worker_count(), 3);
        for i in 0..12 {
            pool.submit(job_for(ChunkCoord::new(i, 0, 0), i as u64));
        }
        let mut tickets: Vec<u64> = (0..12).map(|_| pool.recv().expect("result").ticket).collect();
        tickets.sort_unstable();
        assert_eq!(tickets, (0..12).collect::<Vec<u64>>());
    }

    #[test]
    fn test_lost_workers_keep_finished_results() {
        let mut pool = MeshWorkerPool::new(1).expect("spawn workers");
        pool.submit(job_for(ChunkCoord::new(0, 0, 0), 1));
        while pool.results.is_empty() {
            thread::yield_now();
        }

        // A job queue nobody reads from.
        let (dead, _) = unbounded();
        pool.jobs = Some(dead);
        pool.submit(job_for(ChunkCoord::new(1, 0, 0), 2));

        let mut tickets: Vec<u64> = (0..2).map(|_| pool.recv().expect("result").ticket).collect();
        tickets.sort_unstable();
        assert_eq!(tickets, vec![1, 2]);
        assert!(pool.try_recv().is_none());
    }

    #[test]
    fn test_threaded_matches_inline() {
        let mut inline = MeshWorkerPool::new(0).expect("inline pool");
        let mut threaded = MeshWorkerPool::new(2).expect("spawn workers");
        inline.submit(job_for(ChunkCoord::new(-2, 5, 0), 1));
        threaded.submit(job_for(ChunkCoord::new(-2, 5, 0), 1));
        let a = inline.try_recv().expect("inline result");
        let b = threaded.recv().expect("threaded result");
        assert_eq!(a.mesh, b.mesh);
    }
}
