use crate::dsp::envelope::Envelope;
use crate::graph::node::{GraphNode, RenderCtx};

/// ADSR envelope as a graph node. Renders levels in `0.0..=1.0`, so it is
/// normally used as the modulator of `.amplify()` or as a pitch sweep.
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            env: Envelope::adsr(attack, decay, sustain, release),
        }
    }

    /// Attack and decay only; the classic percussive shape.
    pub fn percussive(attack: f32, decay: f32) -> Self {
        Self::adsr(attack, decay, 0.0, decay)
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx.sample_rate);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.env.note_on();
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.env.note_off(ctx.sample_rate);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.env.level())
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }

    fn reset(&mut self) {
        self.env.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percussive_envelope_decays_to_idle() {
        let ctx = RenderCtx::from_freq(1_000.0, 100.0, 1.0);
        let mut env = EnvNode::percussive(0.001, 0.02);

        env.note_on(&ctx);
        let mut buffer = vec![0.0; 64];
        env.render_block(&mut buffer, &ctx);

        assert!(buffer.iter().any(|&level| level > 0.9));
        assert_eq!(env.get_envelope_level(), Some(0.0));
    }

    #[test]
    fn idle_until_triggered() {
        let env = EnvNode::adsr(0.01, 0.1, 0.5, 0.1);
        assert!(!env.is_active());
    }
}
