use std::fmt;

/// Tempo in whole beats per minute, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo(u16);

impl Tempo {
    pub const MIN: u16 = 60;
    pub const MAX: u16 = 200;
    pub const DEFAULT: Tempo = Tempo(120);

    /// `None` outside the allowed range.
    pub fn new(bpm: i64) -> Option<Self> {
        (Self::MIN as i64..=Self::MAX as i64)
            .contains(&bpm)
            .then_some(Tempo(bpm as u16))
    }

    /// Clamp into range; reports whether clamping happened.
    pub fn clamped(bpm: i64) -> (Self, bool) {
        let clamped = bpm.clamp(Self::MIN as i64, Self::MAX as i64);
        (Tempo(clamped as u16), clamped != bpm)
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    /// Seconds per beat.
    pub fn beat_period(self) -> f64 {
        60.0 / self.0 as f64
    }

    /// Seconds per step: `60 / bpm / steps_per_beat`.
    pub fn step_period(self, steps_per_beat: u32) -> f64 {
        self.beat_period() / steps_per_beat.max(1) as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo::DEFAULT
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

/// Musical length of one grid column.
///
/// Stored as a fraction of a whole note, like a note value on a score;
/// the beat is a quarter note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepUnit {
    Quarter,
    #[default]
    Eighth,
    Sixteenth,
}

impl StepUnit {
    /// Denominator of the note value (4 = quarter, 8 = eighth, ...)
    pub const fn denominator(self) -> u32 {
        match self {
            StepUnit::Quarter => 4,
            StepUnit::Eighth => 8,
            StepUnit::Sixteenth => 16,
        }
    }

    pub const fn steps_per_beat(self) -> u32 {
        self.denominator() / 4
    }

    /// Seconds one step lasts at `tempo`.
    pub fn duration(self, tempo: Tempo) -> f64 {
        tempo.step_period(self.steps_per_beat())
    }
}

impl fmt::Display for StepUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}n", self.denominator())
    }
}
