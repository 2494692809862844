use crate::sequencing::pitch::Pitch;

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz)
/// - velocity: Intensity, 0.0-1.0
/// - time: Audio-clock time of the first frame in the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
    pub time: f64,
}

impl RenderCtx {
    /// Context for a sequenced or played note
    pub fn from_pitch(sample_rate: f32, pitch: Pitch, velocity: f32) -> Self {
        Self::from_freq(sample_rate, pitch.frequency(), velocity)
    }

    /// Context for a fixed frequency (drums, effect buses)
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
            time: 0.0,
        }
    }

    pub fn at(self, time: f64) -> Self {
        Self { time, ..self }
    }
}

/// Trait for nodes that support parameter modulation
pub trait Modulatable: Send {
    type Param: Copy + Send;

    fn get_param(&self, param: Self::Param) -> f32;

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32);
}

/// Core trait for audio processing graph nodes
///
/// Nodes render audio blocks and respond to note events.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    fn note_on(&mut self, _ctx: &RenderCtx) {}

    fn note_off(&mut self, _ctx: &RenderCtx) {}

    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Whether the node is still producing sound
    ///
    /// Voice management uses this to know when a voice can be freed.
    fn is_active(&self) -> bool {
        true
    }

    /// Clear internal state (delay lines, filter memory) without changing
    /// parameters.
    fn reset(&mut self) {}
}

impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn get_envelope_level(&self) -> Option<f32> {
        (**self).get_envelope_level()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
