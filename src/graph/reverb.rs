use crate::dsp::mix::apply_dry_wet;
use crate::dsp::reverb::SchroederReverb;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/// Schroeder room reverb with decay, damping and wet controls.
///
/// Delay lines are sized from the sample rate at construction, so the node
/// has to be built for the stream it will render into.
pub struct ReverbNode {
    reverb: SchroederReverb,
    decay: f32,
    damping: f32,
    wet: f32,
    dry_buffer: Vec<f32>,
}

impl ReverbNode {
    pub fn new(sample_rate: f32, decay: f32, damping: f32, wet: f32) -> Self {
        let mut node = Self {
            reverb: SchroederReverb::new(sample_rate),
            decay: 0.0,
            damping: 0.0,
            wet: wet.clamp(0.0, 1.0),
            dry_buffer: vec![0.0; MAX_BLOCK_SIZE],
        };
        node.set_decay(decay);
        node.set_damping(damping);
        node
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay.clamp(0.0, 1.0);
        self.reverb.set_decay(self.decay);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
        self.reverb.set_damping(self.damping);
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet = wet.clamp(0.0, 1.0);
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }
}

impl GraphNode for ReverbNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        // The tail keeps circulating even while dry so raising wet later
        // does not start from a cold room.
        let len = out.len().min(MAX_BLOCK_SIZE);
        let out = &mut out[..len];
        self.dry_buffer[..len].copy_from_slice(out);

        for sample in out.iter_mut() {
            *sample = self.reverb.process(*sample);
        }

        apply_dry_wet(&self.dry_buffer[..len], out, self.wet);
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
