//! Benchmarks for the Schroeder reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonegrid::dsp::reverb::SchroederReverb;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| if i % 64 == 0 { 1.0 } else { 0.0 }).collect();
        let mut buffer = vec![0.0f32; size];

        for (name, decay) in [("short", 0.2), ("long", 0.9)] {
            let mut reverb = SchroederReverb::new(SAMPLE_RATE);
            reverb.set_decay(decay);
            reverb.set_damping(0.5);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (out, &x) in buffer.iter_mut().zip(input.iter()) {
                        *out = reverb.process(black_box(x));
                    }
                })
            });
        }
    }

    group.finish();
}
