use crate::dsp::envelope::{Envelope, EnvelopeState};
use crate::graph::{node::GraphNode, oscillator::OscNode, RenderCtx};
use crate::sequencing::pitch::Pitch;
use crate::synth::sample::SamplePlayer;
use crate::MAX_BLOCK_SIZE;

/// Where a voice is in its lifecycle, read off its amplitude envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Attacking,
    Decaying,
    Sustaining,
    Releasing,
}

impl From<EnvelopeState> for VoiceState {
    fn from(state: EnvelopeState) -> Self {
        match state {
            EnvelopeState::Idle => VoiceState::Idle,
            EnvelopeState::Attack => VoiceState::Attacking,
            EnvelopeState::Decay => VoiceState::Decaying,
            EnvelopeState::Sustain => VoiceState::Sustaining,
            EnvelopeState::Release => VoiceState::Releasing,
        }
    }
}

/// Raw signal a voice shapes with its envelope.
pub enum VoiceSource {
    Tone(OscNode),
    Sample(SamplePlayer),
    Drum(Box<dyn GraphNode>),
}

impl VoiceSource {
    fn note_on(&mut self, ctx: &RenderCtx) {
        match self {
            VoiceSource::Tone(osc) => osc.note_on(ctx),
            VoiceSource::Sample(player) => player.restart(),
            VoiceSource::Drum(graph) => graph.note_on(ctx),
        }
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        if let VoiceSource::Drum(graph) = self {
            graph.note_off(ctx);
        }
    }

    fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        match self {
            VoiceSource::Tone(osc) => osc.render_block(out, ctx),
            VoiceSource::Sample(player) => player.render(out, ctx.frequency, ctx.sample_rate),
            VoiceSource::Drum(graph) => graph.render_block(out, ctx),
        }
    }

    fn reset(&mut self) {
        match self {
            VoiceSource::Tone(osc) => osc.reset(),
            VoiceSource::Sample(player) => player.restart(),
            VoiceSource::Drum(graph) => graph.reset(),
        }
    }
}

/// One pre-allocated voice: a source, its envelope and the note it plays.
pub struct Voice {
    pitch: Pitch,
    note_id: Option<u64>,
    velocity: f32,
    age: u64,
    source: VoiceSource,
    envelope: Envelope,
    signal: Vec<f32>,
}

impl Voice {
    pub fn new(source: VoiceSource, envelope: Envelope) -> Self {
        Self {
            pitch: Pitch::C4,
            note_id: None,
            velocity: 0.0,
            age: 0,
            source,
            envelope,
            signal: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Gate on. A voice that is still sounding ramps up from its current
    /// level instead of restarting at zero.
    pub fn start(&mut self, pitch: Pitch, velocity: f32, note_id: u64, age: u64, sample_rate: f32) {
        self.pitch = pitch;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.note_id = Some(note_id);
        self.age = age;

        let ctx = RenderCtx::from_pitch(sample_rate, pitch, self.velocity);
        self.source.note_on(&ctx);
        self.envelope.note_on();
    }

    /// Gate off. Ignored when idle or already releasing.
    pub fn release(&mut self, sample_rate: f32) {
        if !self.is_held() {
            return;
        }
        let ctx = RenderCtx::from_pitch(sample_rate, self.pitch, self.velocity);
        self.envelope.note_off(sample_rate);
        self.source.note_off(&ctx);
    }

    /// Cut the voice to silence without a release tail.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.source.reset();
        self.note_id = None;
    }

    /// Add this voice's output into `out`.
    pub fn render_into(&mut self, out: &mut [f32], sample_rate: f32, gain: f32) {
        if !self.envelope.is_active() {
            return;
        }

        let len = out.len().min(MAX_BLOCK_SIZE);
        let ctx = RenderCtx::from_pitch(sample_rate, self.pitch, self.velocity);
        let signal = &mut self.signal[..len];
        self.source.render(signal, &ctx);

        let amp = self.velocity * gain;
        for (o, s) in out[..len].iter_mut().zip(signal.iter()) {
            *o += *s * self.envelope.next_sample(sample_rate) * amp;
        }

        if !self.envelope.is_active() {
            self.note_id = None;
        }
    }

    pub fn set_detune(&mut self, cents: f32) {
        if let VoiceSource::Tone(osc) = &mut self.source {
            osc.set_detune(cents);
        }
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    pub fn state(&self) -> VoiceState {
        self.envelope.state().into()
    }

    pub fn is_idle(&self) -> bool {
        !self.envelope.is_active()
    }

    /// Sounding and not yet released.
    pub fn is_held(&self) -> bool {
        matches!(
            self.state(),
            VoiceState::Attacking | VoiceState::Decaying | VoiceState::Sustaining
        )
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn note_id(&self) -> Option<u64> {
        self.note_id
    }

    pub fn age(&self) -> u64 {
        self.age
    }
}
