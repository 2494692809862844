//! Benchmarks for the state-variable filter in each mode.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonegrid::dsp::filter::{FilterType, SVFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for filter_type in [FilterType::LowPass, FilterType::HighPass, FilterType::BandPass] {
            let mut filter = SVFilter::new(filter_type, 1200.0);
            filter.set_q(4.0);
            group.bench_with_input(BenchmarkId::new(filter_type.as_str(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), SAMPLE_RATE);
                })
            });
        }
    }

    group.finish();
}
