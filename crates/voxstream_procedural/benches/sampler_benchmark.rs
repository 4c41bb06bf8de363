//! Benchmark for noise and terrain sampling.
//!
//! TARGET: a 16³ chunk in well under a millisecond
//!
//! Run with: cargo bench --package voxstream_procedural --bench sampler_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use voxstream_procedural::{FractalParams, HeightmapSampler, NoiseSeed, SimplexNoise, TerrainSampler};
use voxstream_shared::{ChunkCoord, GridParameters};

fn benchmark_noise_sample(c: &mut Criterion) {
    let noise = SimplexNoise::new(NoiseSeed::new(42));

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });

    let params = FractalParams::default();
    c.bench_function("fractal_noise_6_octaves", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.fractal(black_box(x), black_box(x * 0.7), &params))
        });
    });
}

fn benchmark_chunk_sampling(c: &mut Criterion) {
    let sampler = HeightmapSampler::fractal(NoiseSeed::new(42), FractalParams::default());
    let params = GridParameters::terrain_default();

    c.bench_function("sample_chunk_16", |b| {
        let mut i = 0i32;
        b.iter(|| {
            i = i.wrapping_add(1);
            black_box(sampler.sample(ChunkCoord::new(i, i / 2, 0), &params))
        });
    });

    let mut group = c.benchmark_group("chunk_grid");
    group.throughput(Throughput::Elements(16 * 16));
    group.sample_size(20);
    group.bench_function("16x16_columns_of_chunks", |b| {
        b.iter(|| {
            for x in 0..16 {
                for y in 0..16 {
                    black_box(sampler.sample(ChunkCoord::new(x, y, 0), &params));
                }
            }
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_noise_sample, benchmark_chunk_sampling);
criterion_main!(benches);
