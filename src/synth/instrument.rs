use std::str::FromStr;

use crate::effects::EffectParam;
use crate::error::Error;
use crate::sequencing::pitch::Pitch;
use crate::synth::kind::InstrumentSpec;

/// Voice-level parameters shared by every instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentParam {
    Attack,
    Decay,
    Sustain,
    Release,
    /// Oscillator detune in cents; ignored by sampled and percussion voices
    Detune,
}

impl InstrumentParam {
    pub fn path(self) -> &'static str {
        match self {
            InstrumentParam::Attack => "envelope.attack",
            InstrumentParam::Decay => "envelope.decay",
            InstrumentParam::Sustain => "envelope.sustain",
            InstrumentParam::Release => "envelope.release",
            InstrumentParam::Detune => "oscillator.detune",
        }
    }
}

impl FromStr for InstrumentParam {
    type Err = Error;

    /// Accepts dotted paths such as `envelope.attack` or `oscillator.detune`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            InstrumentParam::Attack,
            InstrumentParam::Decay,
            InstrumentParam::Sustain,
            InstrumentParam::Release,
            InstrumentParam::Detune,
        ]
        .into_iter()
        .find(|p| p.path().eq_ignore_ascii_case(s))
        .ok_or_else(|| {
            let (stage, param) = s.split_once('.').unwrap_or(("", s));
            Error::UnknownParameter {
                stage: stage.to_string(),
                param: param.to_string(),
            }
        })
    }
}

/// What the sequencer, console and session may ask of a sound source.
///
/// Times are audio-clock seconds; `None` means "as soon as possible". Every
/// method is infallible: a disposed instrument ignores triggers and logs at
/// debug level.
pub trait Instrument {
    /// Attack now-or-at `time`, release `duration` seconds later.
    fn trigger_attack_release(&mut self, pitch: Pitch, duration: f64, time: Option<f64>, velocity: f32);

    fn trigger_attack(&mut self, pitch: Pitch, time: Option<f64>, velocity: f32);

    fn trigger_release(&mut self, pitch: Pitch, time: Option<f64>);

    fn set_parameter(&mut self, param: InstrumentParam, value: f32);

    fn set_effect(&mut self, param: EffectParam, value: f32);

    /// Drop pending triggers and release every sounding voice.
    fn silence(&mut self);

    /// Release the instrument's resources. Idempotent.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Fixed set of instrument slots. Row bindings and the session address
/// instruments by slot index.
pub trait Rack {
    fn slot_count(&self) -> usize;

    fn slot(&mut self, index: usize) -> Option<&mut dyn Instrument>;

    /// Replace the instrument in `index`. The old instrument is disposed
    /// before the new one is built.
    fn install(&mut self, index: usize, spec: &InstrumentSpec) -> Result<(), Error>;

    fn silence_all(&mut self) {
        for index in 0..self.slot_count() {
            if let Some(instrument) = self.slot(index) {
                instrument.silence();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_paths_parse() {
        assert_eq!("envelope.attack".parse(), Ok(InstrumentParam::Attack));
        assert_eq!("Oscillator.Detune".parse(), Ok(InstrumentParam::Detune));
        assert_eq!(
            "envelope.hold".parse::<InstrumentParam>(),
            Err(Error::UnknownParameter {
                stage: "envelope".into(),
                param: "hold".into()
            })
        );
    }
}
