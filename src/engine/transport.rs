use tracing::{debug, info, warn};

use crate::engine::clock::Clock;
use crate::error::Error;
use crate::sequencing::timing::{StepUnit, Tempo};

/*
Lookahead Transport
===================

The control thread cannot wake up with sample accuracy, so ticks are
scheduled a little ahead of the audio clock and stamped with the exact time
they should sound:

  audio clock ──────────●───────────────────────────→
                       now        now + lookahead
                        |-------------|
  ticks:            ▲       ▲       ▲   │   ▲
                  fired   fired   fired │  not yet
                                        horizon

`pump` is called often (every UI frame) and fires every tick whose time is
before the horizon, in order, each exactly one step after the previous. The
instruments queue the resulting notes and play them on their exact frame.

There is at most one schedule. `start` creates it, `pause` and `stop` drop
it, so a double start can never produce two interleaved tick streams.

Ticks fired before a pause are already queued in the instruments. `pause`
keeps the time of the last one, and the first tick after resuming lands no
earlier than one step after it. `stop` forgets it.

Tempo changes take effect from the next unfired tick: it is moved to
last_tick + new_period (or now, if that has already passed). Ticks already
handed out are never moved or repeated.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportConfig {
    /// How far ahead of the audio clock ticks are fired, in seconds
    pub lookahead: f64,
    /// Gap between `start` and the first tick, in seconds
    pub start_delay: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            lookahead: 0.1,
            start_delay: 0.05,
        }
    }
}

impl TransportConfig {
    pub fn lookahead(mut self, seconds: f64) -> Self {
        self.lookahead = seconds.max(0.0);
        self
    }

    pub fn start_delay(mut self, seconds: f64) -> Self {
        self.start_delay = seconds.max(0.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Running,
    Paused,
}

/// One step boundary, handed to the sequencers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Transport step counter at this tick
    pub index: u64,
    /// Audio-clock time the step should sound at
    pub time: f64,
    /// Step length at the tempo in force when the tick fired
    pub duration: f64,
}

#[derive(Debug, Clone, Copy)]
struct Schedule {
    next_at: f64,
    last_at: Option<f64>,
}

pub struct Transport<C: Clock> {
    clock: C,
    config: TransportConfig,
    state: TransportState,
    tempo: Tempo,
    step_unit: StepUnit,
    current_step: u64,
    schedule: Option<Schedule>,
    /// Last tick handed out before a pause
    paused_at: Option<f64>,
}

impl<C: Clock> Transport<C> {
    pub fn new(clock: C, tempo: Tempo, step_unit: StepUnit) -> Self {
        Self::with_config(clock, tempo, step_unit, TransportConfig::default())
    }

    pub fn with_config(clock: C, tempo: Tempo, step_unit: StepUnit, config: TransportConfig) -> Self {
        Self {
            clock,
            config,
            state: TransportState::Stopped,
            tempo,
            step_unit,
            current_step: 0,
            schedule: None,
            paused_at: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> TransportConfig {
        self.config
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn step_unit(&self) -> StepUnit {
        self.step_unit
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Step length in seconds at the current tempo.
    pub fn step_duration(&self) -> f64 {
        self.step_unit.duration(self.tempo)
    }

    /// Time of the next unfired tick, if a schedule exists.
    pub fn next_tick_time(&self) -> Option<f64> {
        self.schedule.map(|s| s.next_at)
    }

    /// Loop position within a pattern of `steps` columns.
    pub fn position(&self, steps: usize) -> usize {
        (self.current_step % steps.max(1) as u64) as usize
    }

    /// Begin (or resume) firing ticks. Resuming after a pause keeps the step
    /// counter.
    pub fn start(&mut self) -> Result<(), Error> {
        if !self.clock.is_ready() {
            warn!("transport start refused: audio output not unlocked");
            return Err(Error::AudioNotReady);
        }
        if self.state == TransportState::Running {
            return Ok(());
        }

        let mut first = self.clock.now() + self.config.start_delay;
        let last_at = self.paused_at.take();
        if let Some(last) = last_at {
            first = first.max(last + self.step_duration());
        }
        self.schedule = Some(Schedule {
            next_at: first,
            last_at,
        });
        self.state = TransportState::Running;
        info!(
            bpm = self.tempo.bpm(),
            step = self.current_step,
            first_tick = first,
            "transport started"
        );
        Ok(())
    }

    /// Stop firing ticks, keeping the step counter.
    pub fn pause(&mut self) {
        if self.state != TransportState::Running {
            return;
        }
        self.paused_at = self.schedule.take().and_then(|s| s.last_at);
        self.state = TransportState::Paused;
        info!(step = self.current_step, "transport paused");
    }

    /// Stop firing ticks and return to the first step.
    pub fn stop(&mut self) {
        self.schedule = None;
        self.paused_at = None;
        self.current_step = 0;
        if self.state != TransportState::Stopped {
            info!("transport stopped");
        }
        self.state = TransportState::Stopped;
    }

    /// Return to the first step without changing the play state.
    pub fn rewind(&mut self) {
        self.current_step = 0;
    }

    /// Clamp `bpm` into range and apply it from the next unfired tick.
    pub fn set_tempo(&mut self, bpm: i64) -> Tempo {
        let (tempo, clamped) = Tempo::clamped(bpm);
        if clamped {
            debug!(requested = bpm, applied = tempo.bpm(), "tempo clamped");
        }
        if tempo != self.tempo {
            self.tempo = tempo;
            self.reschedule();
            debug!(bpm = tempo.bpm(), "tempo changed");
        }
        tempo
    }

    pub fn set_step_unit(&mut self, step_unit: StepUnit) {
        if step_unit != self.step_unit {
            self.step_unit = step_unit;
            self.reschedule();
        }
    }

    fn reschedule(&mut self) {
        let period = self.step_duration();
        let now = self.clock.now();
        if let Some(schedule) = &mut self.schedule {
            if let Some(last) = schedule.last_at {
                schedule.next_at = (last + period).max(now);
            }
        }
    }

    /// Fire every tick due before `now + lookahead`, in order. Returns how
    /// many fired.
    pub fn pump(&mut self, mut on_tick: impl FnMut(Tick)) -> usize {
        let horizon = self.clock.now() + self.config.lookahead;
        let duration = self.step_duration();
        let Some(schedule) = &mut self.schedule else {
            return 0;
        };

        let mut fired = 0;
        while schedule.next_at < horizon {
            let tick = Tick {
                index: self.current_step,
                time: schedule.next_at,
                duration,
            };
            on_tick(tick);

            self.current_step += 1;
            schedule.last_at = Some(schedule.next_at);
            schedule.next_at += duration;
            fired += 1;
        }
        fired
    }
}
