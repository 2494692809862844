use crate::dsp::mix::{apply_gain, db_to_gain};
use crate::graph::node::{GraphNode, RenderCtx};

/// Output gain stage, set in decibels.
pub struct VolumeNode {
    db: f32,
    gain: f32,
}

impl VolumeNode {
    pub fn new(db: f32) -> Self {
        Self {
            db,
            gain: db_to_gain(db),
        }
    }

    /// Plain linear gain (`1.5` = +3.5 dB).
    pub fn linear(gain: f32) -> Self {
        Self {
            db: 20.0 * gain.max(1e-6).log10(),
            gain,
        }
    }

    pub fn set_db(&mut self, db: f32) {
        self.db = db;
        self.gain = db_to_gain(db);
    }

    pub fn db(&self) -> f32 {
        self.db
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl GraphNode for VolumeNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        apply_gain(out, self.gain);
    }
}
