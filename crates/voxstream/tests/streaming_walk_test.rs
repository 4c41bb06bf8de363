//! # Streaming Walk Integration Test
//!
//! Walks a view across a procedural world and checks that what the renderer
//! holds always matches the resident set.

use std::collections::HashSet;
use std::sync::Arc;

use voxstream::{
    ChunkStreamer, ChunkState, DataCachePolicy, MeshRegistry, RebuildPolicy, StreamerConfig,
};
use voxstream_procedural::{FractalHeightField, FractalParams, HeightmapSampler, NoiseSeed};
use voxstream_shared::{ChunkCoord, GridParameters, Int3, Vec3};

type Streamer = ChunkStreamer<HeightmapSampler<FractalHeightField>, MeshRegistry>;

const RENDER_DISTANCE: i32 = 24;

fn world() -> GridParameters {
    GridParameters::terrain_default()
        .with_chunk_size(Int3::splat(8))
        .with_bounds(Int3::new(-512, -512, 0), Int3::new(512, 512, 24))
        .with_max_height(24)
        .with_render_distance(RENDER_DISTANCE)
}

fn streamer(config: StreamerConfig) -> Streamer {
    let sampler = HeightmapSampler::fractal(
        NoiseSeed::new(42),
        FractalParams {
            octaves: 3,
            frequency: 1.0 / 32.0,
            ..FractalParams::default()
        },
    );
    ChunkStreamer::new(world(), config, sampler, MeshRegistry::new()).expect("valid setup")
}

fn threaded(workers: usize) -> StreamerConfig {
    StreamerConfig {
        worker_threads: workers,
        ..StreamerConfig::default()
    }
}

/// Everything the renderer holds is resident, every resident chunk is
/// built, and the renderer holds exactly the meshes the store accepted.
fn assert_consistent(streamer: &Streamer) {
    let resident: HashSet<ChunkCoord> = streamer.store().resident_coords().into_iter().collect();
    let size = streamer.params().chunk_size;

    for coord in streamer.sink().coords() {
        assert!(resident.contains(&coord), "renderer holds evicted chunk {coord}");
        assert_eq!(streamer.sink().origin(coord), Some(coord.origin(size)));
    }
    for &coord in &resident {
        assert_eq!(streamer.state(coord), ChunkState::MeshActive, "{coord}");
        let entry = streamer.store().entry(coord).expect("resident entry");
        match (&entry.mesh, streamer.sink().mesh(coord)) {
            (Some(stored), Some(shown)) => assert!(Arc::ptr_eq(stored, shown), "{coord}"),
            (None, None) => {}
            _ => panic!("store and renderer disagree on {coord}"),
        }
    }
    assert_eq!(streamer.stats().pending_builds, 0);
}

fn in_cylinder(coord: ChunkCoord, view: Vec3, size: Int3) -> bool {
    let origin = coord.origin(size);
    let dx = f64::from(origin.x) + f64::from(size.x) * 0.5 - f64::from(view.x);
    let dy = f64::from(origin.y) + f64::from(size.y) * 0.5 - f64::from(view.y);
    dx * dx + dy * dy < f64::from(RENDER_DISTANCE * RENDER_DISTANCE)
}

#[test]
fn test_walk_along_x() {
    let mut streamer = streamer(threaded(3));
    let mut view = Vec3::new(0.0, 0.0, 12.0);

    for step in 0..60 {
        view.x += 4.0;
        streamer.update(view);
        if step % 4 == 0 {
            streamer.flush();
            assert_consistent(&streamer);
        }
    }
    streamer.flush();
    assert_consistent(&streamer);

    let size = streamer.params().chunk_size;
    for coord in streamer.store().resident_coords() {
        assert!(in_cylinder(coord, view, size), "{coord} resident outside range");
    }
    let stats = streamer.stats();
    assert!(stats.evicted > 0);
    assert_eq!(stats.admitted - stats.evicted, stats.resident_chunks as u64);
    assert!(!streamer.sink().is_empty());
}

#[test]
fn test_cylindrical_culling_ignores_height() {
    let mut streamer = streamer(StreamerConfig::inline());
    streamer.update(Vec3::new(0.0, 0.0, 12.0));
    let before: HashSet<ChunkCoord> = streamer.store().resident_coords().into_iter().collect();
    assert!(!before.is_empty());

    // Far above the world: nothing new is admitted, nothing is evicted.
    streamer.update(Vec3::new(0.0, 0.0, 10_000.0));
    let after: HashSet<ChunkCoord> = streamer.store().resident_coords().into_iter().collect();
    assert_eq!(before, after);
    assert_eq!(streamer.stats().evicted, 0);

    // Far along X: everything goes.
    streamer.update(Vec3::new(400.0, 0.0, 12.0));
    assert!(before.iter().all(|&c| !streamer.store().is_resident(c)));
    assert!(before.iter().all(|&c| streamer.sink().mesh(c).is_none()));
    assert_consistent(&streamer);
}

#[test]
fn test_fast_walk_then_flush() {
    let mut streamer = streamer(threaded(2));
    let mut view = Vec3::new(-100.0, 30.0, 12.0);
    for _ in 0..40 {
        view.x += 7.0;
        view.y -= 3.0;
        streamer.update(view);
    }
    streamer.flush();
    assert_consistent(&streamer);

    let stats = streamer.stats();
    assert!(stats.built + stats.discarded_stale <= stats.dispatched);
    assert!(stats.published <= stats.built);
}

#[test]
fn test_idle_view_rebuilds_only_on_policy() {
    let view = Vec3::new(16.0, -16.0, 12.0);

    let mut idle = streamer(threaded(2));
    idle.update(view);
    idle.flush();
    let dispatched = idle.stats().dispatched;
    for _ in 0..3 {
        idle.update(view);
    }
    idle.flush();
    assert_eq!(idle.stats().dispatched, dispatched);

    let mut eager = streamer(StreamerConfig {
        rebuild: RebuildPolicy::EveryUpdate,
        ..StreamerConfig::inline()
    });
    eager.update(view);
    let dispatched = eager.stats().dispatched;
    eager.update(view);
    assert_eq!(
        eager.stats().dispatched,
        dispatched + eager.stats().resident_chunks as u64
    );
    assert_consistent(&eager);
}

#[test]
fn test_bounded_cache_stays_within_limit() {
    let max_chunks = 64;
    let mut streamer = streamer(StreamerConfig {
        cache: DataCachePolicy::Bounded { max_chunks },
        ..StreamerConfig::inline()
    });
    let mut view = Vec3::new(0.0, 0.0, 12.0);
    for _ in 0..50 {
        view.x += 6.0;
        streamer.update(view);
        let stats = streamer.stats();
        assert!(stats.cached_grids <= max_chunks.max(stats.resident_chunks));
        for coord in streamer.store().resident_coords() {
            assert!(streamer.store().contains_data(coord), "resident grid {coord} dropped");
        }
    }
    assert_consistent(&streamer);
}

#[test]
fn test_worker_count_does_not_change_meshes() {
    let mut inline = streamer(StreamerConfig::inline());
    let mut pooled = streamer(threaded(3));

    let mut view = Vec3::new(0.0, 0.0, 12.0);
    for _ in 0..12 {
        view.x += 5.0;
        view.y += 2.0;
        inline.update(view);
        pooled.update(view);
        pooled.flush();
    }

    let a: HashSet<ChunkCoord> = inline.sink().coords().collect();
    let b: HashSet<ChunkCoord> = pooled.sink().coords().collect();
    assert_eq!(a, b);
    for coord in a {
        assert_eq!(inline.sink().mesh(coord), pooled.sink().mesh(coord), "{coord}");
    }
}

#[test]
fn test_dropping_streamer_joins_workers() {
    let mut streamer = streamer(threaded(4));
    streamer.update(Vec3::new(0.0, 0.0, 12.0));
    // Builds may still be in flight.
    drop(streamer);
}
