use rtrb::{Consumer, Producer, RingBuffer};

use crate::engine::clock::SampleClock;
use crate::engine::command::{EngineCommand, EngineHandle};
use crate::synth::instrument::Instrument;
use crate::synth::kind::InstrumentSpec;
use crate::synth::poly::Synth;
use crate::MAX_BLOCK_SIZE;

/// Audio-thread side: owns the synths, applies commands and advances the
/// shared clock by every frame it renders.
///
/// Nothing here allocates, frees or locks once constructed. Replaced synths
/// are handed back to the control thread, which never has more installs in
/// flight than the return ring holds.
pub struct Engine {
    synths: Vec<Box<Synth>>,
    commands: Consumer<EngineCommand>,
    retired: Producer<Box<Synth>>,
    clock: SampleClock,
    mix: Vec<f32>,
    scratch: Vec<f32>,
}

/// Build a connected handle/engine pair with one slot per spec.
///
/// The engine goes to the audio callback; the handle and clock stay on the
/// control thread.
pub fn channel(
    sample_rate: f32,
    specs: &[InstrumentSpec],
    capacity: usize,
) -> (EngineHandle, Engine, SampleClock) {
    let (tx, commands) = RingBuffer::new(capacity);
    let retired_capacity = specs.len().max(1) * 4;
    let (retired, retired_rx) = RingBuffer::new(retired_capacity);
    let clock = SampleClock::new(sample_rate);

    let engine = Engine {
        synths: specs
            .iter()
            .map(|spec| Box::new(Synth::new(sample_rate, spec)))
            .collect(),
        commands,
        retired,
        clock: clock.clone(),
        mix: vec![0.0; MAX_BLOCK_SIZE],
        scratch: vec![0.0; MAX_BLOCK_SIZE],
    };
    let handle = EngineHandle::new(sample_rate, specs.len(), tx, retired_rx, retired_capacity);

    (handle, engine, clock)
}

impl Engine {
    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn synth(&self, slot: usize) -> Option<&Synth> {
        self.synths.get(slot).map(|synth| &**synth)
    }

    fn apply(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Trigger { slot, trigger } => {
                if let Some(synth) = self.synths.get_mut(slot) {
                    trigger.apply(&mut **synth);
                }
            }
            EngineCommand::SetParameter { slot, param, value } => {
                if let Some(synth) = self.synths.get_mut(slot) {
                    synth.set_parameter(param, value);
                }
            }
            EngineCommand::SetEffect { slot, param, value } => {
                if let Some(synth) = self.synths.get_mut(slot) {
                    synth.set_effect(param, value);
                }
            }
            EngineCommand::Silence { slot } => {
                if let Some(synth) = self.synths.get_mut(slot) {
                    synth.silence();
                }
            }
            EngineCommand::Dispose { slot } => {
                if let Some(synth) = self.synths.get_mut(slot) {
                    synth.dispose();
                }
            }
            EngineCommand::Install { slot, mut synth } => {
                if let Some(current) = self.synths.get_mut(slot) {
                    current.dispose();
                    synth.set_position(current.position());
                    let old = std::mem::replace(current, synth);
                    let returned = self.retired.push(old);
                    debug_assert!(returned.is_ok(), "retired ring overflow");
                }
            }
        }
    }

    /// Apply pending commands, then render a mono block into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk.len());
            chunk.copy_from_slice(&self.mix[..chunk.len()]);
        }
    }

    /// Render into an interleaved output buffer, the same mono signal on
    /// every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }

        let channels = channels.max(1);
        for frames in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let len = frames.len() / channels;
            self.render_chunk(len);
            for (frame, &sample) in frames.chunks_mut(channels).zip(self.mix.iter()) {
                frame.fill(sample);
            }
        }
    }

    fn render_chunk(&mut self, len: usize) {
        let mix = &mut self.mix[..len];
        mix.fill(0.0);

        let scratch = &mut self.scratch[..len];
        for synth in &mut self.synths {
            synth.render(scratch);
            for (m, s) in mix.iter_mut().zip(scratch.iter()) {
                *m += *s;
            }
        }

        for sample in mix.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
        self.clock.advance(len as u64);
    }
}
