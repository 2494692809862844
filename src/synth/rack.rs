use crate::error::Error;
use crate::synth::instrument::{Instrument, Rack};
use crate::synth::kind::InstrumentSpec;
use crate::synth::poly::Synth;
use crate::MAX_BLOCK_SIZE;

/// Instruments rendered on the calling thread.
///
/// Used for offline rendering and tests. The real-time path keeps its
/// synths inside the audio engine instead.
pub struct LocalRack {
    sample_rate: f32,
    synths: Vec<Synth>,
    scratch: Vec<f32>,
}

impl LocalRack {
    pub fn new(sample_rate: f32, specs: &[InstrumentSpec]) -> Self {
        Self {
            sample_rate,
            synths: specs.iter().map(|spec| Synth::new(sample_rate, spec)).collect(),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn synth(&self, index: usize) -> Option<&Synth> {
        self.synths.get(index)
    }

    /// Frame the next block starts at.
    pub fn position(&self) -> u64 {
        self.synths.first().map_or(0, Synth::position)
    }

    /// Seconds of audio rendered so far.
    pub fn time(&self) -> f64 {
        self.position() as f64 / self.sample_rate as f64
    }

    /// Mix every slot into `out`, overwriting it.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let scratch = &mut self.scratch[..chunk.len()];
            for synth in &mut self.synths {
                synth.render(scratch);
                for (o, s) in chunk.iter_mut().zip(scratch.iter()) {
                    *o += *s;
                }
            }
        }
    }
}

impl Rack for LocalRack {
    fn slot_count(&self) -> usize {
        self.synths.len()
    }

    fn slot(&mut self, index: usize) -> Option<&mut dyn Instrument> {
        self.synths
            .get_mut(index)
            .map(|synth| synth as &mut dyn Instrument)
    }

    fn install(&mut self, index: usize, spec: &InstrumentSpec) -> Result<(), Error> {
        let sample_rate = self.sample_rate;
        let old = self.synths.get_mut(index).ok_or(Error::UnknownSlot(index))?;
        old.dispose();

        let mut synth = Synth::new(sample_rate, spec);
        synth.set_position(old.position());
        *old = synth;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;
    use crate::sequencing::pitch::Pitch;
    use crate::synth::kind::InstrumentKind;
    use crate::voices::DrumKind;

    fn rack() -> LocalRack {
        LocalRack::new(
            48_000.0,
            &[
                InstrumentSpec::tone(Waveform::Sine),
                InstrumentSpec::percussion(DrumKind::Kick),
            ],
        )
    }

    #[test]
    fn install_replaces_and_keeps_position() {
        let mut rack = rack();
        let mut out = vec![0.0; 300];
        rack.render(&mut out);

        rack.install(0, &InstrumentSpec::tone(Waveform::Sawtooth)).unwrap();

        let synth = rack.synth(0).unwrap();
        assert_eq!(
            synth.kind(),
            &InstrumentKind::ToneSynth {
                waveform: Waveform::Sawtooth
            }
        );
        assert_eq!(synth.position(), 300);
    }

    #[test]
    fn unknown_slot_is_an_error() {
        let mut rack = rack();
        assert_eq!(
            rack.install(5, &InstrumentSpec::tone(Waveform::Sine)),
            Err(Error::UnknownSlot(5))
        );
        assert!(rack.slot(5).is_none());
    }

    #[test]
    fn slots_render_summed() {
        let mut rack = rack();
        if let Some(slot) = rack.slot(1) {
            slot.trigger_attack(Pitch::C2, None, 1.0);
        }
        let mut out = vec![0.0; 4096];
        rack.render(&mut out);
        assert!(out.iter().any(|s| s.abs() > 0.01));
        assert!((rack.time() - 4096.0 / 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn silence_all_reaches_every_slot() {
        let mut rack = rack();
        for index in 0..rack.slot_count() {
            if let Some(slot) = rack.slot(index) {
                slot.trigger_attack(Pitch::C4, Some(1.0), 1.0);
            }
        }
        rack.silence_all();
        assert!((0..2).all(|i| rack.synth(i).unwrap().pending_events() == 0));
    }
}
