use crate::dsp::distortion::{amount_to_drive, hard_clip, soft_clip_buffer};
use crate::dsp::mix::apply_dry_wet;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/*
Distortion Node
===============

Waveshaping with a dry/wet blend.

  Soft   warm, tube-like rounding of peaks (the effects-chain stage)
  Hard   buzzy clipping at a threshold (drum grit)

The chain drives this node with `amount` (0..1, mapped exponentially onto
drive) and `wet` (0..1). At wet = 0 the node is bit-transparent.
*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistortionMode {
    Soft,
    Hard,
}

pub struct DistortionNode {
    mode: DistortionMode,
    amount: f32,
    drive: f32,
    wet: f32,
    threshold: f32,
    dry_buffer: Vec<f32>,
}

impl DistortionNode {
    fn new(mode: DistortionMode, amount: f32, wet: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            mode,
            amount,
            drive: amount_to_drive(amount),
            wet: wet.clamp(0.0, 1.0),
            threshold: 1.0,
            dry_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn soft(amount: f32, wet: f32) -> Self {
        Self::new(DistortionMode::Soft, amount, wet)
    }

    pub fn hard(amount: f32, wet: f32) -> Self {
        Self::new(DistortionMode::Hard, amount, wet)
    }

    /// Clip level for hard mode. Floors at 0.01.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.max(0.01);
        self
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
        self.drive = amount_to_drive(self.amount);
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet = wet.clamp(0.0, 1.0);
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }
}

impl GraphNode for DistortionNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        if self.wet <= 0.0 {
            return;
        }

        let len = out.len().min(MAX_BLOCK_SIZE);
        let out = &mut out[..len];
        self.dry_buffer[..len].copy_from_slice(out);

        match self.mode {
            DistortionMode::Soft => soft_clip_buffer(out, self.drive),
            DistortionMode::Hard => {
                for sample in out.iter_mut() {
                    *sample = hard_clip(*sample, self.drive, self.threshold);
                }
            }
        }

        apply_dry_wet(&self.dry_buffer[..len], out, self.wet);
    }
}
