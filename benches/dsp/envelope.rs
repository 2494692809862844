//! Benchmarks for ADSR envelope generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonegrid::dsp::envelope::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Retriggered every block so the attack/decay segments are measured,
        // not a flat sustain.
        let mut env = Envelope::adsr(0.002, 0.01, 0.5, 0.1);
        group.bench_with_input(BenchmarkId::new("attack_decay", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.2);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer), SAMPLE_RATE))
        });
    }

    group.finish();
}
