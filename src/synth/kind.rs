use std::fmt;
use std::sync::Arc;

use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::Waveform;
use crate::effects::ChainSettings;
use crate::error::Error;
use crate::synth::sample::{SampleBank, SampleBuffer};
use crate::voices::DrumKind;

/// The three families of sound source.
#[derive(Debug, Clone)]
pub enum InstrumentKind {
    ToneSynth { waveform: Waveform },
    SampledVoice { name: String, buffer: Arc<SampleBuffer> },
    PercussionVoice { drum: DrumKind },
}

impl InstrumentKind {
    /// Identifier the kind was resolved from.
    pub fn name(&self) -> &str {
        match self {
            InstrumentKind::ToneSynth { waveform } => waveform.as_str(),
            InstrumentKind::SampledVoice { name, .. } => name,
            InstrumentKind::PercussionVoice { drum } => drum.as_str(),
        }
    }
}

impl PartialEq for InstrumentKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ToneSynth { waveform: a }, Self::ToneSynth { waveform: b }) => a == b,
            (Self::SampledVoice { name: a, buffer: x }, Self::SampledVoice { name: b, buffer: y }) => {
                a == b && Arc::ptr_eq(x, y)
            }
            (Self::PercussionVoice { drum: a }, Self::PercussionVoice { drum: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polyphony {
    Mono,
    Poly(usize),
}

impl Polyphony {
    pub fn voices(self) -> usize {
        match self {
            Polyphony::Mono => 1,
            Polyphony::Poly(n) => n.max(1),
        }
    }
}

/// ADSR values in seconds (sustain as a level).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeSettings {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    pub fn build(&self) -> Envelope {
        Envelope::adsr(self.attack, self.decay, self.sustain, self.release)
    }
}

/// Everything needed to build an instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSpec {
    pub kind: InstrumentKind,
    pub envelope: EnvelopeSettings,
    pub polyphony: Polyphony,
    pub chain: ChainSettings,
    pub detune: f32,
}

impl InstrumentSpec {
    /// Defaults suited to `kind`.
    pub fn new(kind: InstrumentKind) -> Self {
        let (envelope, polyphony) = match kind {
            InstrumentKind::ToneSynth { .. } => {
                (EnvelopeSettings::new(0.01, 0.1, 0.5, 0.3), Polyphony::Poly(8))
            }
            InstrumentKind::SampledVoice { .. } => {
                (EnvelopeSettings::new(0.001, 0.1, 1.0, 0.5), Polyphony::Poly(8))
            }
            InstrumentKind::PercussionVoice { .. } => {
                (EnvelopeSettings::new(0.001, 0.5, 0.0, 0.05), Polyphony::Poly(4))
            }
        };

        Self {
            kind,
            envelope,
            polyphony,
            chain: ChainSettings::default(),
            detune: 0.0,
        }
    }

    pub fn tone(waveform: Waveform) -> Self {
        Self::new(InstrumentKind::ToneSynth { waveform })
    }

    pub fn percussion(drum: DrumKind) -> Self {
        Self::new(InstrumentKind::PercussionVoice { drum })
    }

    /// Resolve a sound identifier: oscillator waveforms first, then the
    /// percussion kit, then samples in `bank`.
    pub fn resolve(sound: &str, bank: &SampleBank) -> Result<Self, Error> {
        if let Ok(waveform) = sound.parse::<Waveform>() {
            return Ok(Self::tone(waveform));
        }
        if let Ok(drum) = sound.parse::<DrumKind>() {
            return Ok(Self::percussion(drum));
        }
        if let Some(buffer) = bank.get(sound) {
            return Ok(Self::new(InstrumentKind::SampledVoice {
                name: sound.to_string(),
                buffer,
            }));
        }

        Err(Error::UnknownInstrument {
            category: "sound",
            name: sound.to_string(),
        })
    }

    pub fn with_envelope(mut self, envelope: EnvelopeSettings) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_polyphony(mut self, polyphony: Polyphony) -> Self {
        self.polyphony = polyphony;
        self
    }

    pub fn with_chain(mut self, chain: ChainSettings) -> Self {
        self.chain = chain;
        self
    }
}
