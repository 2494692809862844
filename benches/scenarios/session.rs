//! Benchmark for a full offline session: transport, both grids and every
//! slot rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonegrid::session::{Grid, Session, SessionConfig};
use tonegrid::synth::SampleBank;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/session");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut session = Session::offline(SessionConfig::default(), SAMPLE_RATE, SampleBank::new())
            .expect("default session");
        for step in 0..8 {
            session.toggle_cell(Grid::Melody, step, step).unwrap();
            session.toggle_cell(Grid::Rhythm, step % 4, step).unwrap();
        }
        session.play().unwrap();

        group.bench_with_input(BenchmarkId::new("busy_pattern", size), &size, |b, _| {
            b.iter(|| session.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
