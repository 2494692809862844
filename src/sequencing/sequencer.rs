use tracing::trace;

use crate::engine::transport::Tick;
use crate::sequencing::pattern::Pattern;
use crate::sequencing::pitch::Pitch;
use crate::synth::instrument::Rack;

/// Where one grid row sends its notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBinding {
    pub slot: usize,
    pub pitch: Pitch,
}

impl RowBinding {
    pub fn new(slot: usize, pitch: Pitch) -> Self {
        Self { slot, pitch }
    }
}

/// Plays a pattern into a rack, one column per transport tick.
///
/// Each sequencer keeps its own loop cursor, so a melody and a rhythm grid of
/// different lengths can run from one transport without sharing a step
/// counter.
#[derive(Debug, Clone)]
pub struct Sequencer {
    pattern: Pattern,
    rows: Vec<RowBinding>,
    cursor: u64,
}

impl Sequencer {
    /// Rows beyond `rows.len()` stay silent.
    pub fn new(pattern: Pattern, rows: Vec<RowBinding>) -> Self {
        Self {
            pattern,
            rows,
            cursor: 0,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn pattern_mut(&mut self) -> &mut Pattern {
        &mut self.pattern
    }

    pub fn set_pattern(&mut self, pattern: Pattern) {
        self.pattern = pattern;
    }

    pub fn bindings(&self) -> &[RowBinding] {
        &self.rows
    }

    pub fn set_bindings(&mut self, rows: Vec<RowBinding>) {
        self.rows = rows;
    }

    /// Column the next tick will play.
    pub fn current_step(&self) -> usize {
        (self.cursor % self.pattern.steps().max(1) as u64) as usize
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Play the column under the cursor at the tick's time, then advance.
    pub fn on_tick(&mut self, tick: &Tick, rack: &mut dyn Rack) -> usize {
        let step = self.current_step();
        self.cursor += 1;
        self.on_step(step, tick.time, tick.duration, rack)
    }

    /// Trigger every active row in `step`. Returns the number of notes sent.
    ///
    /// The pattern is read at call time, so edits made between ticks are
    /// heard on the next pass.
    pub fn on_step(&self, step: usize, time: f64, duration: f64, rack: &mut dyn Rack) -> usize {
        let mut sent = 0;
        for (row, velocity) in self.pattern.active_rows(step) {
            let Some(binding) = self.rows.get(row) else {
                continue;
            };
            if let Some(instrument) = rack.slot(binding.slot) {
                instrument.trigger_attack_release(binding.pitch, duration, Some(time), velocity);
                sent += 1;
            }
        }

        if sent > 0 {
            trace!(step, time, sent, "step triggered");
        }
        sent
    }

    /// Empty every cell and restart from the first column.
    pub fn clear_pattern(&mut self) {
        self.pattern.clear();
        self.cursor = 0;
    }
}
