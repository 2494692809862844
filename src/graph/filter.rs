use crate::dsp::filter::{FilterType, SVFilter};
use crate::graph::node::{GraphNode, Modulatable, RenderCtx};

/*
Filter Node
===========

Subtractive shaping: start from a bright source and take harmonics away.

  lowpass    darker as the cutoff falls; basses, pads, kick body
  highpass   thinner as the cutoff rises; hats, removing rumble
  bandpass   only a band around the cutoff; claps, telephone voice
  notch      a hole at the cutoff; phaser-like hollowness

Cutoff guide:

  200 Hz     muffled, through a wall
  1 kHz      warm and round
  5 kHz      present, clear
  20 kHz     fully open

Q sets the emphasis at the cutoff. 0.707 is flat; above ~5 the filter starts
to whistle and near 30 it rings at the cutoff on every transient.
*/

#[derive(Clone, Copy, Debug)]
pub enum FilterParam {
    Cutoff,
    Q,
}

pub struct FilterNode {
    filter: SVFilter,
    base_cutoff: f32,
    base_q: f32,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::new(filter_type, cutoff_hz),
            base_cutoff: cutoff_hz,
            base_q: SVFilter::DEFAULT_Q,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz)
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.set_q(q);
        self
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.base_cutoff = cutoff_hz;
        self.filter.set_cutoff(cutoff_hz);
    }

    pub fn set_q(&mut self, q: f32) {
        self.base_q = q;
        self.filter.set_q(q);
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter.set_type(filter_type);
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff()
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.base_cutoff,
            FilterParam::Q => self.base_q,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        let value = base + modulation;
        match param {
            FilterParam::Cutoff => self.filter.set_cutoff(value.clamp(20.0, 20_000.0)),
            FilterParam::Q => self.filter.set_q(value.clamp(0.1, 30.0)),
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx.sample_rate);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
