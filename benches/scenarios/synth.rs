//! Benchmarks for polyphonic synths and the effects chain.
//!
//! Voice counts match what the melody grid can ask for: one note, a triad,
//! and all eight rows at once.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonegrid::dsp::oscillator::Waveform;
use tonegrid::effects::{ChainSettings, EffectParam, EffectsChain};
use tonegrid::graph::node::RenderCtx;
use tonegrid::sequencing::{Pitch, Scale};
use tonegrid::synth::{Instrument, InstrumentSpec, Synth};
use tonegrid::voices::DrumKind;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn held(spec: &InstrumentSpec, pitches: &[Pitch]) -> Synth {
    let mut synth = Synth::new(SAMPLE_RATE, spec);
    for &pitch in pitches {
        synth.trigger_attack(pitch, None, 0.8);
    }
    synth
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");
    let scale = Scale::Major.pitches();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, voices) in [("saw_1", 1), ("saw_3", 3), ("saw_8", 8)] {
            let mut synth = held(&InstrumentSpec::tone(Waveform::Sawtooth), &scale[..voices]);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| synth.render(black_box(&mut buffer)))
            });
        }

        // Drums are retriggered every block; their graphs are heavier than
        // a single oscillator.
        for drum in [DrumKind::Kick, DrumKind::Snare, DrumKind::Clap] {
            let mut synth = Synth::new(SAMPLE_RATE, &InstrumentSpec::percussion(drum));
            group.bench_with_input(BenchmarkId::new(drum.as_str(), size), &size, |b, _| {
                b.iter(|| {
                    synth.trigger_attack_release(Pitch::C2, 0.1, None, 1.0);
                    synth.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");
    let ctx = RenderCtx::from_pitch(SAMPLE_RATE, Pitch::A4, 1.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| ((i as f32) * 0.05).sin() * 0.5)
            .collect();
        let mut buffer = input.clone();

        let mut bypass = EffectsChain::new(SAMPLE_RATE, &ChainSettings::default());
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                bypass.process(black_box(&mut buffer), &ctx);
            })
        });

        let settings = ChainSettings::default()
            .with(EffectParam::FilterFrequency, 900.0)
            .with(EffectParam::FilterQ, 6.0)
            .with(EffectParam::DistortionAmount, 0.7)
            .with(EffectParam::DistortionWet, 0.5)
            .with(EffectParam::ReverbWet, 0.4)
            .with(EffectParam::VolumeDb, -6.0);
        let mut full = EffectsChain::new(SAMPLE_RATE, &settings);
        group.bench_with_input(BenchmarkId::new("all_stages", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                full.process(black_box(&mut buffer), &ctx);
            })
        });
    }

    group.finish();
}
