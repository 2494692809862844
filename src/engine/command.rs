use std::cell::RefCell;
use std::rc::Rc;

use rtrb::{Consumer, Producer};
use tracing::{debug, warn};

use crate::effects::EffectParam;
use crate::error::Error;
use crate::sequencing::pitch::Pitch;
use crate::synth::instrument::{Instrument, InstrumentParam, Rack};
use crate::synth::kind::InstrumentSpec;
use crate::synth::poly::Synth;

/// A note trigger, replayed on the audio thread against the slot's synth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    AttackRelease {
        pitch: Pitch,
        duration: f64,
        time: Option<f64>,
        velocity: f32,
    },
    Attack {
        pitch: Pitch,
        time: Option<f64>,
        velocity: f32,
    },
    Release {
        pitch: Pitch,
        time: Option<f64>,
    },
}

impl Trigger {
    pub fn apply(self, instrument: &mut dyn Instrument) {
        match self {
            Trigger::AttackRelease {
                pitch,
                duration,
                time,
                velocity,
            } => instrument.trigger_attack_release(pitch, duration, time, velocity),
            Trigger::Attack {
                pitch,
                time,
                velocity,
            } => instrument.trigger_attack(pitch, time, velocity),
            Trigger::Release { pitch, time } => instrument.trigger_release(pitch, time),
        }
    }
}

/// Control → audio messages. Synths for `Install` are built on the control
/// thread so the audio thread never allocates.
pub enum EngineCommand {
    Trigger { slot: usize, trigger: Trigger },
    SetParameter { slot: usize, param: InstrumentParam, value: f32 },
    SetEffect { slot: usize, param: EffectParam, value: f32 },
    Silence { slot: usize },
    Dispose { slot: usize },
    Install { slot: usize, synth: Box<Synth> },
}

type SharedProducer = Rc<RefCell<Producer<EngineCommand>>>;

fn send(tx: &SharedProducer, command: EngineCommand) -> Result<(), Error> {
    tx.borrow_mut().push(command).map_err(|_| {
        warn!("engine command queue full, command dropped");
        Error::CommandQueueFull
    })
}

/// Control-thread stand-in for one engine slot.
pub struct RemoteInstrument {
    slot: usize,
    tx: SharedProducer,
    disposed: bool,
}

impl RemoteInstrument {
    fn send(&self, command: EngineCommand) {
        // Dropped commands are already logged; triggers are fire-and-forget.
        let _ = send(&self.tx, command);
    }

    fn trigger(&self, trigger: Trigger) {
        if self.disposed {
            debug!(slot = self.slot, "ignoring trigger on disposed instrument");
            return;
        }
        self.send(EngineCommand::Trigger {
            slot: self.slot,
            trigger,
        });
    }
}

impl Instrument for RemoteInstrument {
    fn trigger_attack_release(&mut self, pitch: Pitch, duration: f64, time: Option<f64>, velocity: f32) {
        self.trigger(Trigger::AttackRelease {
            pitch,
            duration,
            time,
            velocity,
        });
    }

    fn trigger_attack(&mut self, pitch: Pitch, time: Option<f64>, velocity: f32) {
        self.trigger(Trigger::Attack {
            pitch,
            time,
            velocity,
        });
    }

    fn trigger_release(&mut self, pitch: Pitch, time: Option<f64>) {
        self.trigger(Trigger::Release { pitch, time });
    }

    fn set_parameter(&mut self, param: InstrumentParam, value: f32) {
        if !self.disposed {
            self.send(EngineCommand::SetParameter {
                slot: self.slot,
                param,
                value,
            });
        }
    }

    fn set_effect(&mut self, param: EffectParam, value: f32) {
        if !self.disposed {
            self.send(EngineCommand::SetEffect {
                slot: self.slot,
                param,
                value,
            });
        }
    }

    fn silence(&mut self) {
        self.send(EngineCommand::Silence { slot: self.slot });
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.send(EngineCommand::Dispose { slot: self.slot });
            self.disposed = true;
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Control-thread side of the engine. Implements [`Rack`] by forwarding
/// everything through the command ring.
pub struct EngineHandle {
    sample_rate: f32,
    slots: Vec<RemoteInstrument>,
    tx: SharedProducer,
    retired: Consumer<Box<Synth>>,
    retired_capacity: usize,
    /// Installs sent whose replaced synth has not been collected yet
    in_flight: usize,
}

impl EngineHandle {
    pub(crate) fn new(
        sample_rate: f32,
        slot_count: usize,
        tx: Producer<EngineCommand>,
        retired: Consumer<Box<Synth>>,
        retired_capacity: usize,
    ) -> Self {
        let tx = Rc::new(RefCell::new(tx));
        let slots = (0..slot_count)
            .map(|slot| RemoteInstrument {
                slot,
                tx: tx.clone(),
                disposed: false,
            })
            .collect();

        Self {
            sample_rate,
            slots,
            tx,
            retired,
            retired_capacity,
            in_flight: 0,
        }
    }

    /// Free synths the engine swapped out. Called on every install so
    /// deallocation stays off the audio thread.
    pub fn collect_retired(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(synth) = self.retired.pop() {
            drop(synth);
            freed += 1;
        }
        self.in_flight = self.in_flight.saturating_sub(freed);
        freed
    }
}

impl Rack for EngineHandle {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&mut self, index: usize) -> Option<&mut dyn Instrument> {
        self.slots
            .get_mut(index)
            .map(|remote| remote as &mut dyn Instrument)
    }

    fn install(&mut self, index: usize, spec: &InstrumentSpec) -> Result<(), Error> {
        self.collect_retired();
        if index >= self.slots.len() {
            return Err(Error::UnknownSlot(index));
        }

        // Dispose and Install go out together or not at all, and the engine
        // must always have room to hand the old synth back.
        if self.tx.borrow().slots() < 2 || self.in_flight >= self.retired_capacity {
            warn!(
                slot = index,
                in_flight = self.in_flight,
                "engine busy, instrument not replaced"
            );
            return Err(Error::CommandQueueFull);
        }

        let synth = Box::new(Synth::new(self.sample_rate, spec));
        let remote = &mut self.slots[index];
        remote.dispose();
        send(&self.tx, EngineCommand::Install { slot: index, synth })?;
        remote.disposed = false;
        self.in_flight += 1;
        Ok(())
    }
}
