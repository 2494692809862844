use std::collections::VecDeque;

use tracing::{debug, info};

use crate::console::{ConsoleAction, InputEvent, SynthConsole};
use crate::effects::{ChainSettings, EffectParam};
use crate::engine::clock::{Clock, ManualClock};
use crate::engine::transport::{Transport, TransportConfig, TransportState};
use crate::error::Error;
use crate::sequencing::pattern::{Pattern, MAX_BARS};
use crate::sequencing::pitch::Pitch;
use crate::sequencing::preset::{Preset, PresetLayout};
use crate::sequencing::scale::Scale;
use crate::sequencing::sequencer::{RowBinding, Sequencer};
use crate::sequencing::timing::{StepUnit, Tempo};
use crate::synth::instrument::{Instrument, InstrumentParam, Rack};
use crate::synth::kind::{InstrumentSpec, Polyphony};
use crate::synth::rack::LocalRack;
use crate::synth::sample::SampleBank;
use crate::voices::DrumKind;

/// Rack slot the melody grid and the console play.
pub const MELODY_SLOT: usize = 0;

/*
Session
=======

A session owns everything one sequencer screen needs:

  Transport ──tick──→ melody Sequencer ──→ slot 0      (selected sound)
                  └──→ rhythm Sequencer ──→ slot 1..n  (one drum per row)
  SynthConsole ─────────────────────────→ slot 0

The rack decides where sound is made. `LocalRack` renders on the calling
thread, `EngineHandle` forwards every call to the audio thread.

Sound changes dispose the old melody instrument before its replacement is
built. Presets are validated and their sound resolved before anything is
touched, so a rejected preset leaves the session exactly as it was.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grid {
    Melody,
    Rhythm,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub steps_per_bar: usize,
    pub step_unit: StepUnit,
    pub bars: usize,
    pub tempo: Tempo,
    /// Melody polyphony; 1 makes the melody instrument monophonic
    pub voices: usize,
    pub scale: Scale,
    pub sound: String,
    pub volume_db: f32,
    /// Rhythm rows, top to bottom. Row `i` plays slot `i + 1`.
    pub drums: Vec<DrumKind>,
    pub transport: TransportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            steps_per_bar: 8,
            step_unit: StepUnit::Eighth,
            bars: 1,
            tempo: Tempo::DEFAULT,
            voices: 8,
            scale: Scale::Major,
            sound: "sine".to_string(),
            volume_db: -10.0,
            drums: vec![DrumKind::Kick, DrumKind::Snare, DrumKind::HiHat, DrumKind::Clap],
            transport: TransportConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn steps_per_bar(mut self, steps: usize) -> Self {
        self.steps_per_bar = steps.max(1);
        self
    }

    pub fn step_unit(mut self, step_unit: StepUnit) -> Self {
        self.step_unit = step_unit;
        self
    }

    pub fn bars(mut self, bars: usize) -> Self {
        self.bars = bars.clamp(1, MAX_BARS);
        self
    }

    pub fn bpm(mut self, bpm: i64) -> Self {
        self.tempo = Tempo::clamped(bpm).0;
        self
    }

    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices.max(1);
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    pub fn volume(mut self, db: f32) -> Self {
        self.volume_db = EffectParam::VolumeDb.clamp(db).0;
        self
    }

    pub fn drums(mut self, drums: Vec<DrumKind>) -> Self {
        self.drums = drums;
        self
    }

    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn polyphony(&self) -> Polyphony {
        match self.voices {
            0 | 1 => Polyphony::Mono,
            n => Polyphony::Poly(n),
        }
    }

    /// Grid shape presets must match.
    pub fn layout(&self) -> PresetLayout {
        PresetLayout {
            rhythm_rows: self.drum_rows(),
            steps_per_bar: self.steps_per_bar,
            step_unit: self.step_unit,
        }
    }

    /// Melody instrument for `sound` with this config's polyphony.
    pub fn melody_spec(
        &self,
        sound: &str,
        bank: &SampleBank,
        chain: &ChainSettings,
    ) -> Result<InstrumentSpec, Error> {
        Ok(InstrumentSpec::resolve(sound, bank)?
            .with_polyphony(self.polyphony())
            .with_chain(chain.clone()))
    }

    /// One spec per rack slot: the melody sound, then every drum row.
    pub fn instrument_specs(&self, bank: &SampleBank) -> Result<Vec<InstrumentSpec>, Error> {
        let chain = ChainSettings::default().with(EffectParam::VolumeDb, self.volume_db);
        let mut specs = vec![self.melody_spec(&self.sound, bank, &chain)?];
        specs.extend(
            self.drums
                .iter()
                .map(|&drum| InstrumentSpec::percussion(drum).with_chain(chain.clone())),
        );
        Ok(specs)
    }

    fn drum_rows(&self) -> Vec<String> {
        self.drums.iter().map(|d| d.as_str().to_string()).collect()
    }

    fn melody_pattern(&self, scale: Scale) -> Pattern {
        Pattern::new(scale_rows(scale), self.steps_per_bar, self.bars)
            .with_tempo(self.tempo)
            .with_step_unit(self.step_unit)
    }

    fn rhythm_pattern(&self) -> Pattern {
        Pattern::new(self.drum_rows(), self.steps_per_bar, self.bars)
            .with_tempo(self.tempo)
            .with_step_unit(self.step_unit)
    }

    fn rhythm_bindings(&self) -> Vec<RowBinding> {
        (0..self.drums.len())
            .map(|row| RowBinding::new(MELODY_SLOT + 1 + row, Pitch::C2))
            .collect()
    }
}

fn scale_rows(scale: Scale) -> Vec<String> {
    scale.pitches().iter().map(ToString::to_string).collect()
}

fn melody_bindings(scale: Scale) -> Vec<RowBinding> {
    scale
        .pitches()
        .into_iter()
        .map(|pitch| RowBinding::new(MELODY_SLOT, pitch))
        .collect()
}

pub struct Session<C: Clock, R: Rack> {
    config: SessionConfig,
    transport: Transport<C>,
    melody: Sequencer,
    rhythm: Sequencer,
    console: SynthConsole,
    rack: R,
    bank: SampleBank,
    sound: String,
    scale: Scale,
    chain: ChainSettings,
    /// Fired ticks not yet reached by the clock, as (time, melody column)
    pending_steps: VecDeque<(f64, usize)>,
    playhead: Option<usize>,
}

impl<C: Clock, R: Rack> Session<C, R> {
    /// `rack` must hold the instruments `config.instrument_specs` describes.
    pub fn new(config: SessionConfig, clock: C, rack: R, bank: SampleBank) -> Result<Self, Error> {
        let needed = MELODY_SLOT + 1 + config.drums.len();
        if rack.slot_count() < needed {
            return Err(Error::UnknownSlot(needed - 1));
        }

        let transport = Transport::with_config(clock, config.tempo, config.step_unit, config.transport);
        let melody = Sequencer::new(config.melody_pattern(config.scale), melody_bindings(config.scale));
        let rhythm = Sequencer::new(config.rhythm_pattern(), config.rhythm_bindings());

        Ok(Self {
            transport,
            melody,
            rhythm,
            console: SynthConsole::default(),
            rack,
            bank,
            sound: config.sound.clone(),
            scale: config.scale,
            chain: ChainSettings::default().with(EffectParam::VolumeDb, config.volume_db),
            pending_steps: VecDeque::new(),
            playhead: None,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    pub fn rack(&self) -> &R {
        &self.rack
    }

    pub fn rack_mut(&mut self) -> &mut R {
        &mut self.rack
    }

    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    pub fn console(&self) -> &SynthConsole {
        &self.console
    }

    pub fn pattern(&self, grid: Grid) -> &Pattern {
        self.sequencer(grid).pattern()
    }

    fn sequencer(&self, grid: Grid) -> &Sequencer {
        match grid {
            Grid::Melody => &self.melody,
            Grid::Rhythm => &self.rhythm,
        }
    }

    fn sequencer_mut(&mut self, grid: Grid) -> &mut Sequencer {
        match grid {
            Grid::Melody => &mut self.melody,
            Grid::Rhythm => &mut self.rhythm,
        }
    }

    pub fn sound(&self) -> &str {
        &self.sound
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn tempo(&self) -> Tempo {
        self.transport.tempo()
    }

    pub fn bars(&self) -> usize {
        self.melody.pattern().bars()
    }

    pub fn volume_db(&self) -> f32 {
        self.chain.get(EffectParam::VolumeDb)
    }

    /// Current value of a melody effect parameter.
    pub fn effect(&self, param: EffectParam) -> f32 {
        self.chain.get(param)
    }

    // -- transport --------------------------------------------------------

    /// Start or resume playback. Fails with `AudioNotReady` before the
    /// output is unlocked, in which case nothing changes.
    pub fn play(&mut self) -> Result<(), Error> {
        self.transport.start()
    }

    /// Stop ticking but keep the position. Notes already scheduled inside
    /// the lookahead window still play out.
    pub fn pause(&mut self) {
        self.transport.pause();
    }

    /// Stop ticking, cancel everything scheduled and return to step 0.
    pub fn stop(&mut self) {
        self.transport.stop();
        self.melody.rewind();
        self.rhythm.rewind();
        self.rack.silence_all();
        self.pending_steps.clear();
        self.playhead = None;
    }

    /// Play when paused or stopped, pause when playing. Returns whether the
    /// transport is now running.
    pub fn toggle_playback(&mut self) -> Result<bool, Error> {
        if self.is_playing() {
            self.pause();
        } else {
            self.play()?;
        }
        Ok(self.is_playing())
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_running()
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// Fire due ticks into both sequencers. Call this often; returns the
    /// number of notes triggered.
    pub fn pump(&mut self) -> usize {
        let Self {
            transport,
            melody,
            rhythm,
            rack,
            pending_steps,
            playhead,
            ..
        } = self;

        let mut notes = 0;
        transport.pump(|tick| {
            pending_steps.push_back((tick.time, melody.current_step()));
            notes += melody.on_tick(&tick, &mut *rack);
            notes += rhythm.on_tick(&tick, &mut *rack);
        });
        advance_playhead(pending_steps, playhead, transport.clock().now());
        notes
    }

    /// Column the next tick will play.
    pub fn current_step(&self) -> usize {
        self.melody.current_step()
    }

    /// Melody column sounding right now, following the audio clock rather
    /// than the lookahead.
    pub fn playhead(&mut self) -> Option<usize> {
        let now = self.transport.clock().now();
        advance_playhead(&mut self.pending_steps, &mut self.playhead, now);
        self.playhead
    }

    // -- editing ----------------------------------------------------------

    pub fn toggle_cell(&mut self, grid: Grid, row: usize, step: usize) -> Result<bool, Error> {
        self.sequencer_mut(grid).pattern_mut().toggle(row, step)
    }

    pub fn set_cell_velocity(
        &mut self,
        grid: Grid,
        row: usize,
        step: usize,
        velocity: f32,
    ) -> Result<(), Error> {
        self.sequencer_mut(grid)
            .pattern_mut()
            .set_velocity(row, step, velocity)
    }

    /// Empty both grids and restart from the first column. Playback keeps
    /// running.
    pub fn clear_pattern(&mut self) {
        self.melody.clear_pattern();
        self.rhythm.clear_pattern();
        self.transport.rewind();
        self.pending_steps.clear();
        self.playhead = None;
        debug!("pattern cleared");
    }

    /// Clamp and apply a tempo from the next tick on.
    pub fn set_tempo(&mut self, bpm: i64) -> Tempo {
        let tempo = self.transport.set_tempo(bpm);
        self.melody.pattern_mut().set_tempo(tempo);
        self.rhythm.pattern_mut().set_tempo(tempo);
        tempo
    }

    /// Resize both grids. Returns the applied bar count.
    pub fn set_bars(&mut self, bars: usize) -> usize {
        self.melody.pattern_mut().set_bars(bars);
        self.rhythm.pattern_mut().set_bars(bars);
        let applied = self.melody.pattern().bars();
        debug!(bars = applied, "bar count changed");
        applied
    }

    // -- sound ------------------------------------------------------------

    /// Replace the melody instrument. An unknown name fails before the
    /// current instrument is touched.
    pub fn select_sound(&mut self, sound: &str) -> Result<(), Error> {
        let spec = self.config.melody_spec(sound, &self.bank, &self.chain)?;
        self.install_melody(&spec)?;
        self.sound = sound.to_string();
        info!(sound, "sound selected");
        Ok(())
    }

    fn install_melody(&mut self, spec: &InstrumentSpec) -> Result<(), Error> {
        self.rack.install(MELODY_SLOT, spec)?;
        // The old instrument was disposed with its held keys sounding.
        self.handle_input(InputEvent::Blur);
        Ok(())
    }

    /// Switch the melody rows to `scale`, keeping every cell.
    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
        self.melody.pattern_mut().relabel(scale_rows(scale));
        self.melody.set_bindings(melody_bindings(scale));
        debug!(scale = scale.as_str(), "scale selected");
    }

    pub fn select_scale(&mut self, name: &str) -> Result<Scale, Error> {
        let scale: Scale = name.parse()?;
        self.set_scale(scale);
        Ok(scale)
    }

    // -- mix --------------------------------------------------------------

    /// Set the output level of every instrument. Returns the clamped level.
    pub fn set_volume(&mut self, db: f32) -> f32 {
        let applied = self.chain.set(EffectParam::VolumeDb, db);
        for slot in 0..self.rack.slot_count() {
            if let Some(instrument) = self.rack.slot(slot) {
                instrument.set_effect(EffectParam::VolumeDb, applied);
            }
        }
        applied
    }

    /// Set a named effect parameter on the melody chain, e.g.
    /// `("filter", "frequency")`. Volume applies to every instrument.
    pub fn set_effect(&mut self, stage: &str, param: &str, value: f32) -> Result<f32, Error> {
        let param = EffectParam::lookup(stage, param)?;
        if param == EffectParam::VolumeDb {
            return Ok(self.set_volume(value));
        }

        let applied = self.chain.set(param, value);
        self.melody_instrument()?.set_effect(param, applied);
        Ok(applied)
    }

    /// Set an envelope or oscillator parameter on the melody instrument by
    /// dotted path, e.g. `envelope.attack`.
    pub fn set_instrument_parameter(&mut self, path: &str, value: f32) -> Result<(), Error> {
        let param: InstrumentParam = path.parse()?;
        self.melody_instrument()?.set_parameter(param, value);
        Ok(())
    }

    fn melody_instrument(&mut self) -> Result<&mut dyn Instrument, Error> {
        self.rack
            .slot(MELODY_SLOT)
            .ok_or(Error::UnknownSlot(MELODY_SLOT))
    }

    // -- input ------------------------------------------------------------

    /// Play the melody instrument from the keyboard or pointer, independent
    /// of the transport.
    pub fn handle_input(&mut self, event: InputEvent) -> ConsoleAction {
        match self.rack.slot(MELODY_SLOT) {
            Some(instrument) => self.console.handle(event, instrument),
            None => ConsoleAction::Ignored,
        }
    }

    pub fn set_input_velocity(&mut self, velocity: f32) {
        self.console.set_velocity(velocity);
    }

    // -- presets ----------------------------------------------------------

    /// Replace the whole session state with `preset`. Validation and sound
    /// lookup happen first; on error nothing is changed.
    pub fn load_preset(&mut self, preset: &Preset) -> Result<(), Error> {
        let valid = preset.validate(&self.config.layout())?;
        let chain = self.chain.clone().with(EffectParam::VolumeDb, valid.volume_db);
        let spec = self.config.melody_spec(&valid.sound, &self.bank, &chain)?;

        self.install_melody(&spec)?;
        self.sound = valid.sound;
        self.chain = chain;
        self.set_volume(valid.volume_db);

        self.set_tempo(valid.tempo.bpm() as i64);
        self.scale = valid.scale;
        self.melody.set_bindings(melody_bindings(valid.scale));
        self.melody.set_pattern(valid.melody);
        self.rhythm.set_pattern(valid.rhythm);
        self.melody.rewind();
        self.rhythm.rewind();
        self.transport.rewind();

        info!(
            sound = %self.sound,
            scale = self.scale.as_str(),
            bpm = valid.tempo.bpm(),
            bars = valid.bars,
            "preset loaded"
        );
        Ok(())
    }

    pub fn load_preset_json(&mut self, json: &str) -> Result<(), Error> {
        let preset = Preset::from_json(json)?;
        self.load_preset(&preset)
    }

    /// Snapshot the session in the stored preset format.
    pub fn to_preset(&self) -> Preset {
        Preset {
            bpm: self.tempo().bpm() as i64,
            volume: self.volume_db().round() as i64,
            selected_sound: self.sound.clone(),
            selected_scale: self.scale.as_str().to_string(),
            num_bars: self.bars() as i64,
            melody_grid: self.melody.pattern().to_grid(),
            rhythm_grid: self.rhythm.pattern().to_grid(),
            is_default: false,
        }
    }
}

/// Move every fired step that has started sounding by `now` into the
/// playhead. What remains is at most one lookahead window of steps.
fn advance_playhead(pending: &mut VecDeque<(f64, usize)>, playhead: &mut Option<usize>, now: f64) {
    while let Some(&(time, step)) = pending.front() {
        if time > now {
            break;
        }
        *playhead = Some(step);
        pending.pop_front();
    }
}

impl Session<ManualClock, LocalRack> {
    /// A session rendered on the calling thread, its clock following the
    /// audio it renders.
    pub fn offline(config: SessionConfig, sample_rate: f32, bank: SampleBank) -> Result<Self, Error> {
        let specs = config.instrument_specs(&bank)?;
        let rack = LocalRack::new(sample_rate, &specs);
        Self::new(config, ManualClock::new(), rack, bank)
    }

    /// Pump, render one block and move the clock to the end of it.
    pub fn render(&mut self, out: &mut [f32]) -> usize {
        let notes = self.pump();
        self.rack.render(out);
        self.transport.clock().set(self.rack.time());
        notes
    }
}
