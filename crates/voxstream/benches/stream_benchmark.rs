//! Benchmark for the streaming walk.
//!
//! TARGET: one `update` per frame at walking speed stays well inside a
//! 16ms frame with inline builds
//!
//! Run with: cargo bench --package voxstream --bench stream_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voxstream::{ChunkStreamer, NullSink, StreamerConfig};
use voxstream_procedural::{FractalParams, HeightmapSampler, NoiseSeed};
use voxstream_shared::{GridParameters, Vec3};

fn benchmark_walk(c: &mut Criterion) {
    let params = GridParameters::terrain_default().with_render_distance(48);
    let sampler = HeightmapSampler::fractal(NoiseSeed::new(42), FractalParams::default());
    let Ok(mut streamer) = ChunkStreamer::new(params, StreamerConfig::inline(), sampler, NullSink) else {
        return;
    };

    let mut view = Vec3::new(0.0, 0.0, 32.0);
    streamer.update(view);

    c.bench_function("walk_one_voxel_inline", |b| {
        b.iter(|| {
            view.x += 1.0;
            streamer.update(black_box(view));
        });
    });
}

fn benchmark_warm_start(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_start");
    group.sample_size(10);
    group.bench_function("first_update_and_flush_pooled", |b| {
        b.iter(|| {
            let sampler = HeightmapSampler::fractal(NoiseSeed::new(7), FractalParams::default());
            let Ok(mut streamer) =
                ChunkStreamer::new(GridParameters::terrain_default(), StreamerConfig::default(), sampler, NullSink)
            else {
                return;
            };
            streamer.update(Vec3::new(0.0, 0.0, 32.0));
            streamer.flush();
            black_box(streamer.stats());
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_walk, benchmark_warm_start);
criterion_main!(benches);
