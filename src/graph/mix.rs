use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/// Linear crossfade of two parallel sources.
///
/// `balance` 0.0 is all A, 1.0 is all B. Weights sum to one. Both sources
/// receive note events, so put a shared envelope after the mix when both
/// should be gated together.
pub struct Mix<A, B> {
    source_a: A,
    source_b: B,
    balance: f32,
    scratch: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn new(source_a: A, source_b: B, balance: f32) -> Self {
        Self {
            source_a,
            source_b,
            balance: balance.clamp(0.0, 1.0),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<A: GraphNode, B: GraphNode> GraphNode for Mix<A, B> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source_a.render_block(out, ctx);

        let len = out.len().min(MAX_BLOCK_SIZE);
        let b = &mut self.scratch[..len];
        b.fill(0.0);
        self.source_b.render_block(b, ctx);

        let weight_b = self.balance;
        let weight_a = 1.0 - weight_b;
        for (o, b) in out.iter_mut().zip(b.iter()) {
            *o = *o * weight_a + *b * weight_b;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source_a.note_on(ctx);
        self.source_b.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source_a.note_off(ctx);
        self.source_b.note_off(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        match (
            self.source_a.get_envelope_level(),
            self.source_b.get_envelope_level(),
        ) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    fn is_active(&self) -> bool {
        self.source_a.is_active() || self.source_b.is_active()
    }

    fn reset(&mut self) {
        self.source_a.reset();
        self.source_b.reset();
    }
}
