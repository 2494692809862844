#![allow(dead_code)]

use tonegrid::effects::EffectParam;
use tonegrid::error::Error;
use tonegrid::sequencing::Pitch;
use tonegrid::synth::{Instrument, InstrumentParam, InstrumentSpec, Rack};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AttackRelease {
        pitch: Pitch,
        duration: f64,
        time: Option<f64>,
        velocity: f32,
    },
    Attack(Pitch),
    Release(Pitch),
    Parameter(InstrumentParam, f32),
    Effect(EffectParam, f32),
    Silence,
    Dispose,
}

/// Instrument that only remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingInstrument {
    pub calls: Vec<Call>,
    pub disposed: bool,
    pub kind: Option<String>,
}

impl RecordingInstrument {
    pub fn attack_releases(&self) -> Vec<(Pitch, f64)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::AttackRelease { pitch, time, .. } => Some((*pitch, time.unwrap_or(-1.0))),
                _ => None,
            })
            .collect()
    }
}

impl Instrument for RecordingInstrument {
    fn trigger_attack_release(&mut self, pitch: Pitch, duration: f64, time: Option<f64>, velocity: f32) {
        if !self.disposed {
            self.calls.push(Call::AttackRelease {
                pitch,
                duration,
                time,
                velocity,
            });
        }
    }

    fn trigger_attack(&mut self, pitch: Pitch, _time: Option<f64>, _velocity: f32) {
        if !self.disposed {
            self.calls.push(Call::Attack(pitch));
        }
    }

    fn trigger_release(&mut self, pitch: Pitch, _time: Option<f64>) {
        if !self.disposed {
            self.calls.push(Call::Release(pitch));
        }
    }

    fn set_parameter(&mut self, param: InstrumentParam, value: f32) {
        self.calls.push(Call::Parameter(param, value));
    }

    fn set_effect(&mut self, param: EffectParam, value: f32) {
        self.calls.push(Call::Effect(param, value));
    }

    fn silence(&mut self) {
        self.calls.push(Call::Silence);
    }

    fn dispose(&mut self) {
        self.calls.push(Call::Dispose);
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Rack of recording instruments. `install` records the replaced slot's
/// history in `retired` and starts the slot afresh.
#[derive(Debug, Default)]
pub struct RecordingRack {
    pub slots: Vec<RecordingInstrument>,
    pub retired: Vec<RecordingInstrument>,
}

impl RecordingRack {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: (0..slots).map(|_| RecordingInstrument::default()).collect(),
            retired: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.calls.clear();
        }
    }

    pub fn note_count(&self) -> usize {
        self.slots.iter().map(|s| s.attack_releases().len()).sum()
    }
}

impl Rack for RecordingRack {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&mut self, index: usize) -> Option<&mut dyn Instrument> {
        self.slots
            .get_mut(index)
            .map(|slot| slot as &mut dyn Instrument)
    }

    fn install(&mut self, index: usize, spec: &InstrumentSpec) -> Result<(), Error> {
        let slot = self.slots.get_mut(index).ok_or(Error::UnknownSlot(index))?;
        slot.dispose();
        let old = std::mem::replace(
            slot,
            RecordingInstrument {
                kind: Some(spec.kind.name().to_string()),
                ..Default::default()
            },
        );
        self.retired.push(old);
        Ok(())
    }
}
