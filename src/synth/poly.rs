use tracing::{debug, warn};

use crate::effects::{EffectParam, EffectsChain, NodeId};
use crate::graph::{oscillator::OscNode, RenderCtx};
use crate::sequencing::pitch::Pitch;
use crate::synth::instrument::{Instrument, InstrumentParam};
use crate::synth::kind::{EnvelopeSettings, InstrumentKind, InstrumentSpec, Polyphony};
use crate::synth::sample::SamplePlayer;
use crate::synth::schedule::{EventQueue, NoteEvent, EVENT_CAPACITY};
use crate::synth::voice::{Voice, VoiceSource, VoiceState};
use crate::MAX_BLOCK_SIZE;

/// Per-voice gain so a full chord stays clear of clipping.
const VOICE_HEADROOM: f32 = 0.3;

/// Detune range in cents.
const MAX_DETUNE: f32 = 1_200.0;

/*
Synth
=====

A bank of pre-allocated voices behind one effects chain.

  triggers ──→ EventQueue ──→ voices (summed) ──→ EffectsChain ──→ out
               (frame-stamped)

Triggers carry audio-clock times that are usually a little in the future.
They are converted to frames and queued. `render` splits each block at the
queued frames, applies the events that fall due and renders the voices up to
the next one, so a note starts on its exact frame rather than at the next
block boundary:

  block:  |-------- 128 frames ---------|
  events:        ↑ attack @ +37
  render: [0..37) apply [37..128)

Voice allocation for an attack, in order of preference:

  1. the voice already playing this pitch (retrigger, no doubled note)
  2. an idle voice
  3. the oldest voice in its release tail
  4. the oldest voice overall

A release only touches the note it belongs to. `trigger_attack_release`
tags both events with a note id, so if the same pitch was retriggered in the
meantime the stale release is ignored.
*/

pub struct Synth {
    kind: InstrumentKind,
    sample_rate: f32,
    polyphony: Polyphony,
    envelope: EnvelopeSettings,
    voices: Vec<Voice>,
    queue: EventQueue,
    chain: EffectsChain,
    id: NodeId,
    frame: u64,
    next_note_id: u64,
    age: u64,
    disposed: bool,
}

impl Synth {
    pub fn new(sample_rate: f32, spec: &InstrumentSpec) -> Self {
        let voices = (0..spec.polyphony.voices())
            .map(|_| Voice::new(Self::source(&spec.kind, spec.detune), spec.envelope.build()))
            .collect();

        let id = NodeId::next();
        let mut chain = EffectsChain::new(sample_rate, &spec.chain);
        chain.connect(id);

        debug!(
            kind = %spec.kind,
            voices = spec.polyphony.voices(),
            "instrument built"
        );

        Self {
            kind: spec.kind.clone(),
            sample_rate,
            polyphony: spec.polyphony,
            envelope: spec.envelope,
            voices,
            queue: EventQueue::with_capacity(EVENT_CAPACITY),
            chain,
            id,
            frame: 0,
            next_note_id: 0,
            age: 0,
            disposed: false,
        }
    }

    fn source(kind: &InstrumentKind, detune: f32) -> VoiceSource {
        match kind {
            InstrumentKind::ToneSynth { waveform } => {
                VoiceSource::Tone(OscNode::new(*waveform).with_detune(detune))
            }
            InstrumentKind::SampledVoice { buffer, .. } => {
                VoiceSource::Sample(SamplePlayer::new(buffer.clone()))
            }
            InstrumentKind::PercussionVoice { drum } => VoiceSource::Drum(drum.build()),
        }
    }

    pub fn kind(&self) -> &InstrumentKind {
        &self.kind
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn chain(&self) -> &EffectsChain {
        &self.chain
    }

    pub fn envelope(&self) -> EnvelopeSettings {
        self.envelope
    }

    /// Frame the next rendered block starts at.
    pub fn position(&self) -> u64 {
        self.frame
    }

    /// Align the synth with an external clock. Used when an instrument is
    /// swapped in while audio is running.
    pub fn set_position(&mut self, frame: u64) {
        self.frame = frame;
    }

    pub fn voice_states(&self) -> Vec<VoiceState> {
        self.voices.iter().map(Voice::state).collect()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_idle()).count()
    }

    /// Pitches of voices that are sounding and not released.
    pub fn held_pitches(&self) -> Vec<Pitch> {
        self.voices
            .iter()
            .filter(|v| v.is_held())
            .map(Voice::pitch)
            .collect()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    fn frame_at(&self, time: Option<f64>) -> u64 {
        match time {
            None => self.frame,
            Some(t) => ((t * self.sample_rate as f64).round() as u64).max(self.frame),
        }
    }

    fn note_id(&mut self) -> u64 {
        self.next_note_id += 1;
        self.next_note_id
    }

    fn ignore_disposed(&self, action: &str) -> bool {
        if self.disposed {
            debug!(kind = %self.kind, action, "ignoring trigger on disposed instrument");
        }
        self.disposed
    }

    fn allocate(&self, pitch: Pitch) -> usize {
        if self.polyphony == Polyphony::Mono {
            return 0;
        }

        let voices = &self.voices;
        voices
            .iter()
            .position(|v| !v.is_idle() && v.pitch() == pitch)
            .or_else(|| voices.iter().position(Voice::is_idle))
            .or_else(|| {
                voices
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.state() == VoiceState::Releasing)
                    .min_by_key(|(_, v)| v.age())
                    .map(|(i, _)| i)
            })
            .or_else(|| {
                voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(i, _)| i)
            })
            .unwrap_or(0)
    }

    fn apply(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::Attack {
                pitch,
                velocity,
                note_id,
            } => {
                let index = self.allocate(pitch);
                self.age += 1;
                let (age, sample_rate) = (self.age, self.sample_rate);
                if let Some(voice) = self.voices.get_mut(index) {
                    voice.start(pitch, velocity, note_id, age, sample_rate);
                }
            }
            NoteEvent::Release { pitch, note_id } => {
                let sample_rate = self.sample_rate;
                let voice = self.voices.iter_mut().find(|v| {
                    v.is_held()
                        && v.pitch() == pitch
                        && note_id.map_or(true, |id| v.note_id() == Some(id))
                });
                if let Some(voice) = voice {
                    voice.release(sample_rate);
                }
            }
        }
    }

    /// Render the next block into `out`, overwriting it.
    pub fn render(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let len = out.len();
        let start = self.frame;
        let end = start + len as u64;

        if self.disposed {
            self.frame = end;
            return;
        }

        let mut cursor = 0;
        while cursor < len {
            while let Some(event) = self.queue.pop_due(start + cursor as u64) {
                self.apply(event);
            }

            let next = self
                .queue
                .next_frame()
                .filter(|&frame| frame < end)
                .map_or(len, |frame| (frame - start) as usize);

            let segment = &mut out[cursor..next];
            for voice in &mut self.voices {
                voice.render_into(segment, self.sample_rate, VOICE_HEADROOM);
            }
            cursor = next;
        }

        let ctx = RenderCtx::from_freq(self.sample_rate, 0.0, 1.0)
            .at(start as f64 / self.sample_rate as f64);
        self.chain.process(out, &ctx);
        self.frame = end;
    }
}

impl Instrument for Synth {
    fn trigger_attack_release(&mut self, pitch: Pitch, duration: f64, time: Option<f64>, velocity: f32) {
        if self.ignore_disposed("attack_release") {
            return;
        }
        let note_id = self.note_id();
        let start = self.frame_at(time);
        let length = (duration.max(0.0) * self.sample_rate as f64).round().max(1.0) as u64;

        // The attack only goes in if its release fits too.
        if self.queue.remaining() < 2 {
            warn!(kind = %self.kind, "event queue full, note dropped");
            return;
        }
        self.queue.push(
            start,
            NoteEvent::Attack {
                pitch,
                velocity,
                note_id,
            },
        );
        self.queue.push(
            start + length,
            NoteEvent::Release {
                pitch,
                note_id: Some(note_id),
            },
        );
    }

    fn trigger_attack(&mut self, pitch: Pitch, time: Option<f64>, velocity: f32) {
        if self.ignore_disposed("attack") {
            return;
        }
        let note_id = self.note_id();
        let frame = self.frame_at(time);
        let queued = self.queue.push(
            frame,
            NoteEvent::Attack {
                pitch,
                velocity,
                note_id,
            },
        );
        if !queued {
            warn!(kind = %self.kind, "event queue full, note dropped");
        }
    }

    fn trigger_release(&mut self, pitch: Pitch, time: Option<f64>) {
        if self.ignore_disposed("release") {
            return;
        }
        let frame = self.frame_at(time);
        let release = NoteEvent::Release { pitch, note_id: None };
        if !self.queue.push(frame, release) {
            // Full queue: release now rather than leave the note stuck.
            self.apply(release);
        }
    }

    fn set_parameter(&mut self, param: InstrumentParam, value: f32) {
        if self.disposed {
            return;
        }
        match param {
            InstrumentParam::Attack => {
                self.envelope.attack = value.max(0.0);
                self.voices
                    .iter_mut()
                    .for_each(|v| v.envelope_mut().set_attack(value));
            }
            InstrumentParam::Decay => {
                self.envelope.decay = value.max(0.0);
                self.voices
                    .iter_mut()
                    .for_each(|v| v.envelope_mut().set_decay(value));
            }
            InstrumentParam::Sustain => {
                self.envelope.sustain = value.clamp(0.0, 1.0);
                self.voices
                    .iter_mut()
                    .for_each(|v| v.envelope_mut().set_sustain(value));
            }
            InstrumentParam::Release => {
                self.envelope.release = value.max(0.0);
                self.voices
                    .iter_mut()
                    .for_each(|v| v.envelope_mut().set_release(value));
            }
            InstrumentParam::Detune => {
                let cents = value.clamp(-MAX_DETUNE, MAX_DETUNE);
                if cents != value {
                    debug!(requested = value, applied = cents, "detune clamped");
                }
                self.voices.iter_mut().for_each(|v| v.set_detune(cents));
            }
        }
    }

    fn set_effect(&mut self, param: EffectParam, value: f32) {
        if !self.disposed {
            self.chain.set(param, value);
        }
    }

    fn silence(&mut self) {
        self.queue.clear();
        let sample_rate = self.sample_rate;
        for voice in &mut self.voices {
            voice.release(sample_rate);
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.queue.clear();
        self.voices.iter_mut().for_each(Voice::kill);
        self.chain.reset();
        self.chain.disconnect();
        self.disposed = true;
        debug!(kind = %self.kind, "instrument disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
