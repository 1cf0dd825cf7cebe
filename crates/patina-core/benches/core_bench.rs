//! Criterion benchmarks for patina-core DSP primitives
//!
//! Run with: cargo bench -p patina-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patina_core::{AnalogShaper, CurveFamily, HalfBand4x, ProcessorParams, Sinc8x, Spline4x};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_shaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("AnalogShaper");

    for curve in [
        CurveFamily::Soft,
        CurveFamily::Warm,
        CurveFamily::Tape,
        CurveFamily::Vintage,
    ] {
        let input = generate_test_signal(1024);
        group.bench_with_input(
            BenchmarkId::new("process_block", format!("{curve:?}")),
            &curve,
            |b, &curve| {
                let mut shaper = AnalogShaper::new();
                shaper.configure(&ProcessorParams {
                    curve,
                    ..ProcessorParams::default()
                });
                let mut block = input.clone();
                b.iter(|| {
                    block.copy_from_slice(&input);
                    shaper.process_block(black_box(&mut block));
                });
            },
        );
    }

    group.finish();
}

fn bench_interpolators(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interpolators");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("halfband_round_trip", block_size),
            &block_size,
            |b, &n| {
                let mut hb = HalfBand4x::new(n);
                let mut up = vec![0.0f32; n * 4];
                let mut back = vec![0.0f32; n];
                b.iter(|| {
                    hb.up(black_box(&input), &mut up);
                    hb.down(black_box(&up), &mut back);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sinc8_round_trip", block_size),
            &block_size,
            |b, &n| {
                let mut sinc = Sinc8x::new(n);
                let mut up = vec![0.0f32; n * 8];
                let mut back = vec![0.0f32; n];
                b.iter(|| {
                    sinc.up(black_box(&input), &mut up);
                    sinc.down(black_box(&up), &mut back);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("spline_round_trip", block_size),
            &block_size,
            |b, &n| {
                let mut spline = Spline4x::new(n);
                let mut up = vec![0.0f32; n * 4];
                let mut back = vec![0.0f32; n];
                b.iter(|| {
                    spline.up(black_box(&input), &mut up);
                    spline.down(black_box(&up), &mut back);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_shaper, bench_interpolators);
criterion_main!(benches);
