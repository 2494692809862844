use crate::graph::node::{GraphNode, Modulatable, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/*
Modulate Node
=============

Drives one parameter of a node from another signal:

    value = base + average(modulator over the block) × depth

Modulation is applied once per block, not per sample. At 128 frames and
48 kHz that is a 2.7 ms update step, fine for pitch sweeps on drums and
filter motion, too coarse for audio-rate FM.

The percussion kit uses it for pitch envelopes: an oscillator pinned at the
resting pitch plus an envelope-driven upward offset that decays away.
*/

pub struct Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    source: S,
    modulator: L,
    param: S::Param,
    depth: f32,
    scratch: Vec<f32>,
}

impl<S, L> Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    pub fn new(source: S, modulator: L, param: S::Param, depth: f32) -> Self {
        Self {
            source,
            modulator,
            param,
            depth,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

fn block_average(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    buffer.iter().sum::<f32>() / buffer.len() as f32
}

impl<S, L> GraphNode for Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len().min(MAX_BLOCK_SIZE);
        let control = &mut self.scratch[..len];
        self.modulator.render_block(control, ctx);

        let base = self.source.get_param(self.param);
        self.source
            .apply_modulation(self.param, base, block_average(control) * self.depth);

        self.source.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.source.get_envelope_level()
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }

    fn reset(&mut self) {
        self.source.reset();
        self.modulator.reset();
    }
}
