use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/// Multiplies a signal by a modulator, sample by sample.
///
/// With an envelope as the modulator this is a VCA; with an audio-rate
/// oscillator it becomes ring modulation.
pub struct Amplify<N, M> {
    signal: N,
    modulator: M,
    scratch: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        let len = out.len().min(MAX_BLOCK_SIZE);
        let gain = &mut self.scratch[..len];
        gain.fill(0.0);
        self.modulator.render_block(gain, ctx);

        for (o, g) in out.iter_mut().zip(gain.iter()) {
            *o *= *g;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.modulator
            .get_envelope_level()
            .or_else(|| self.signal.get_envelope_level())
    }

    /// A VCA is silent once its envelope has closed, whatever the source does.
    fn is_active(&self) -> bool {
        self.modulator.is_active()
    }

    fn reset(&mut self) {
        self.signal.reset();
        self.modulator.reset();
    }
}
