use crate::MIN_TIME;

/*
ADSR Envelope
=============

A linear attack/decay/sustain/release generator. Each voice owns one and
multiplies its raw signal by the envelope level, sample by sample.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
         A    D       S        R

Stages map one-to-one onto a voice's lifecycle:

  Idle ──gate on──→ Attack ──1.0──→ Decay ──S──→ Sustain   (S = 0 goes Idle)
    ↑                  │               │            │
    │                  └─────── gate off ───────────┘
    │                                  ↓
    └──────────── 0.0 ───────────── Release

Gate off releases from whatever level the envelope has reached, so a short
note that never finished its attack fades out from where it was instead of
jumping to the sustain level first.

Gate on while the envelope is still sounding (a retrigger or a stolen voice)
ramps up from the current level rather than snapping to zero. Snapping would
put a discontinuity in the waveform, which is audible as a click.

Attack and decay increments are derived from the current parameter values on
every sample, so live parameter edits bend the ramp that is in progress.
Release snapshots its length at gate off so it always lands exactly on 0.0.
*/

/// Stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3)
    }
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = seconds.max(MIN_TIME);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = seconds.max(MIN_TIME);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level.clamp(0.0, 1.0);
    }

    /// Takes effect from the next gate off.
    pub fn set_release(&mut self, seconds: f32) {
        self.release_time = seconds.max(MIN_TIME);
    }

    /// Gate high.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low. Ignored while idle.
    pub fn note_off(&mut self, sample_rate: f32) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance by one sample and return the new level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * sample_rate);

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                self.level -= (1.0 - target) / (self.decay_time * sample_rate);

                if self.level <= target {
                    self.level = target;
                    // Nothing left to hold at zero sustain
                    self.stage = if target <= 0.0 {
                        EnvelopeState::Idle
                    } else {
                        EnvelopeState::Sustain
                    };
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope levels.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn attack(&self) -> f32 {
        self.attack_time
    }

    pub fn decay(&self) -> f32 {
        self.decay_time
    }

    pub fn sustain(&self) -> f32 {
        self.sustain_level
    }

    pub fn release(&self) -> f32 {
        self.release_time
    }
}
