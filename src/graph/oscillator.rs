use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::graph::node::{GraphNode, Modulatable, RenderCtx};

/*
Audio Oscillator Node
=====================

Wraps the phase-accumulator oscillator so it can sit in a graph. By default
it follows the pitch carried in the render context, which is what tonal
instruments want. Drums instead pin a fixed frequency with `with_frequency`
and sweep it with a pitch envelope:

  // Kick: settles at 50 Hz after a fast sweep down from ~200 Hz
  OscNode::sine()
      .with_frequency(50.0)
      .modulate(EnvNode::adsr(0.001, 0.06, 0.0, 0.0), OscParam::Frequency, 150.0)

Character of each waveform:

  sine      fundamental only; sub bass, soft bells
  triangle  weak odd harmonics; mellow leads
  square    strong odd harmonics; hollow, woody
  sawtooth  every harmonic; bright, brassy
  noise     no pitch; snares, hats, claps
*/

pub struct OscNode {
    osc: Oscillator,
    /// Fixed frequency in Hz. When set, the context pitch is ignored.
    base_frequency: Option<f32>,
    /// Fixed frequency after modulation
    current_frequency: f32,
    /// 100 cents = 1 semitone
    detune_cents: f32,
}

#[derive(Clone, Copy, Debug)]
pub enum OscParam {
    Frequency,
    Detune,
}

impl OscNode {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            osc: Oscillator::new(waveform),
            base_frequency: None,
            current_frequency: 440.0,
            detune_cents: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn noise() -> Self {
        Self::new(Waveform::Noise)
    }

    /// Pin the oscillator to a fixed frequency.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.base_frequency = Some(freq);
        self.current_frequency = freq;
        self
    }

    pub fn with_detune(mut self, cents: f32) -> Self {
        self.detune_cents = cents;
        self
    }

    pub fn set_detune(&mut self, cents: f32) {
        self.detune_cents = cents;
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let base = if self.base_frequency.is_some() {
            self.current_frequency
        } else {
            ctx.frequency
        };

        let freq = if self.detune_cents != 0.0 {
            base * 2.0_f32.powf(self.detune_cents / 1200.0)
        } else {
            base
        };

        self.osc.render(out, freq, ctx.sample_rate);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
        if let Some(base) = self.base_frequency {
            self.current_frequency = base;
        }
    }

    fn reset(&mut self) {
        self.osc.reset();
    }
}

impl Modulatable for OscNode {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            OscParam::Frequency => self.base_frequency.unwrap_or(440.0),
            OscParam::Detune => self.detune_cents,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        match param {
            OscParam::Frequency => {
                self.current_frequency = (base + modulation).clamp(20.0, 20_000.0);
            }
            OscParam::Detune => {
                self.detune_cents = (base + modulation).clamp(-1200.0, 1200.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::pitch::Pitch;
    use std::f32::consts::TAU;

    #[test]
    fn follows_context_pitch() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_pitch(sample_rate, Pitch::A4, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        let expected = (TAU * 440.0 * 12.0 / sample_rate).sin();
        assert!((buffer[12] - expected).abs() < 1e-4);
    }

    #[test]
    fn fixed_frequency_ignores_context() {
        let mut fixed = OscNode::sine().with_frequency(100.0);
        let mut reference = OscNode::sine();

        let mut a = vec![0.0f32; 64];
        let mut b = vec![0.0f32; 64];
        fixed.render_block(&mut a, &RenderCtx::from_freq(48_000.0, 1_000.0, 1.0));
        reference.render_block(&mut b, &RenderCtx::from_freq(48_000.0, 100.0, 1.0));

        assert_eq!(a, b);
    }

    #[test]
    fn frequency_modulation_is_clamped() {
        let mut osc = OscNode::sine().with_frequency(50.0);
        osc.apply_modulation(OscParam::Frequency, 50.0, -500.0);
        assert_eq!(osc.current_frequency, 20.0);
    }
}
