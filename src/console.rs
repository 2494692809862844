//! Live playing from a computer keyboard or a pointer.
//!
//! ```text
//!  w e   t y u         z / x  shift an octave down / up
//! a s d f g h j k
//! C . D . E F . G . A . B C
//! ```
//!
//! The console only tracks which inputs are held and turns transitions into
//! triggers. Key repeat from the OS arrives as repeated key-downs; a key that
//! is already held never re-attacks.

use std::collections::HashMap;

use tracing::trace;

use crate::sequencing::pitch::Pitch;
use crate::synth::instrument::Instrument;

const MAX_OCTAVE_SHIFT: i8 = 3;

#[derive(Debug, Clone)]
pub struct KeyMap {
    base: Pitch,
    semitones: HashMap<char, i16>,
    octave_down: char,
    octave_up: char,
}

impl Default for KeyMap {
    fn default() -> Self {
        let semitones = "awsedftgyhujk"
            .chars()
            .zip(0..)
            .collect::<HashMap<char, i16>>();
        Self {
            base: Pitch::C4,
            semitones,
            octave_down: 'z',
            octave_up: 'x',
        }
    }
}

impl KeyMap {
    pub fn new(base: Pitch) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Bind `key` to `semitones` above the base pitch.
    pub fn bind(mut self, key: char, semitones: i16) -> Self {
        self.semitones.insert(key.to_ascii_lowercase(), semitones);
        self
    }

    pub fn pitch_of(&self, key: char, octave_shift: i8) -> Option<Pitch> {
        let offset = *self.semitones.get(&key.to_ascii_lowercase())?;
        self.base.transpose(offset + octave_shift as i16 * 12)
    }

    pub fn is_bound(&self, key: char) -> bool {
        let key = key.to_ascii_lowercase();
        self.semitones.contains_key(&key) || key == self.octave_down || key == self.octave_up
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(char),
    KeyUp(char),
    PointerDown(Pitch),
    PointerUp,
    PointerLeave,
    /// Window or terminal lost focus; nothing is held any more.
    Blur,
}

/// What a handled event did.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Attack(Pitch),
    Release(Pitch),
    ReleaseAll(Vec<Pitch>),
    OctaveShift(i8),
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SynthConsole {
    keymap: KeyMap,
    octave: i8,
    velocity: f32,
    held: HashMap<char, Pitch>,
    pointer: Option<Pitch>,
}

impl Default for SynthConsole {
    fn default() -> Self {
        Self::new(KeyMap::default())
    }
}

impl SynthConsole {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            octave: 0,
            velocity: 0.8,
            held: HashMap::new(),
            pointer: None,
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity.clamp(0.0, 1.0);
    }

    /// Pitches currently held by keys or the pointer, lowest first.
    pub fn held_pitches(&self) -> Vec<Pitch> {
        let mut pitches: Vec<Pitch> = self.held.values().copied().chain(self.pointer).collect();
        pitches.sort();
        pitches.dedup();
        pitches
    }

    fn is_sounding(&self, pitch: Pitch) -> bool {
        self.pointer == Some(pitch) || self.held.values().any(|&p| p == pitch)
    }

    pub fn handle(&mut self, event: InputEvent, instrument: &mut dyn Instrument) -> ConsoleAction {
        let action = match event {
            InputEvent::KeyDown(key) => self.key_down(key.to_ascii_lowercase(), instrument),
            InputEvent::KeyUp(key) => self.key_up(key.to_ascii_lowercase(), instrument),
            InputEvent::PointerDown(pitch) => self.pointer_down(pitch, instrument),
            InputEvent::PointerUp | InputEvent::PointerLeave => match self.pointer.take() {
                Some(pitch) => self.release(pitch, instrument),
                None => ConsoleAction::Ignored,
            },
            InputEvent::Blur => self.release_all(instrument),
        };

        if action != ConsoleAction::Ignored {
            trace!(?event, ?action, "console input");
        }
        action
    }

    fn key_down(&mut self, key: char, instrument: &mut dyn Instrument) -> ConsoleAction {
        if key == self.keymap.octave_down || key == self.keymap.octave_up {
            let step = if key == self.keymap.octave_up { 1 } else { -1 };
            let octave = (self.octave + step).clamp(-MAX_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
            if octave == self.octave {
                return ConsoleAction::Ignored;
            }
            self.octave = octave;
            return ConsoleAction::OctaveShift(octave);
        }

        if self.held.contains_key(&key) {
            return ConsoleAction::Ignored;
        }
        let Some(pitch) = self.keymap.pitch_of(key, self.octave) else {
            return ConsoleAction::Ignored;
        };

        instrument.trigger_attack(pitch, None, self.velocity);
        self.held.insert(key, pitch);
        ConsoleAction::Attack(pitch)
    }

    fn key_up(&mut self, key: char, instrument: &mut dyn Instrument) -> ConsoleAction {
        match self.held.remove(&key) {
            Some(pitch) => self.release(pitch, instrument),
            None => ConsoleAction::Ignored,
        }
    }

    fn pointer_down(&mut self, pitch: Pitch, instrument: &mut dyn Instrument) -> ConsoleAction {
        match self.pointer {
            Some(current) if current == pitch => return ConsoleAction::Ignored,
            Some(current) => {
                self.pointer = None;
                self.release(current, instrument);
            }
            None => {}
        }

        instrument.trigger_attack(pitch, None, self.velocity);
        self.pointer = Some(pitch);
        ConsoleAction::Attack(pitch)
    }

    /// Release `pitch` unless another held input still plays it.
    fn release(&mut self, pitch: Pitch, instrument: &mut dyn Instrument) -> ConsoleAction {
        if self.is_sounding(pitch) {
            return ConsoleAction::Ignored;
        }
        instrument.trigger_release(pitch, None);
        ConsoleAction::Release(pitch)
    }

    fn release_all(&mut self, instrument: &mut dyn Instrument) -> ConsoleAction {
        let pitches = self.held_pitches();
        self.held.clear();
        self.pointer = None;

        if pitches.is_empty() {
            return ConsoleAction::Ignored;
        }
        for &pitch in &pitches {
            instrument.trigger_release(pitch, None);
        }
        ConsoleAction::ReleaseAll(pitches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectParam;
    use crate::synth::instrument::InstrumentParam;

    #[derive(Debug, PartialEq)]
    enum Call {
        Attack(Pitch),
        Release(Pitch),
    }

    #[derive(Default)]
    struct Calls(Vec<Call>);

    impl Instrument for Calls {
        fn trigger_attack_release(&mut self, _: Pitch, _: f64, _: Option<f64>, _: f32) {}
        fn trigger_attack(&mut self, pitch: Pitch, _: Option<f64>, _: f32) {
            self.0.push(Call::Attack(pitch));
        }
        fn trigger_release(&mut self, pitch: Pitch, _: Option<f64>) {
            self.0.push(Call::Release(pitch));
        }
        fn set_parameter(&mut self, _: InstrumentParam, _: f32) {}
        fn set_effect(&mut self, _: EffectParam, _: f32) {}
        fn silence(&mut self) {}
        fn dispose(&mut self) {}
        fn is_disposed(&self) -> bool {
            false
        }
    }

    fn pitch(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    #[test]
    fn default_map_is_one_chromatic_octave() {
        let map = KeyMap::default();
        assert_eq!(map.pitch_of('a', 0), Some(Pitch::C4));
        assert_eq!(map.pitch_of('w', 0), Some(pitch("C#4")));
        assert_eq!(map.pitch_of('h', 0), Some(Pitch::A4));
        assert_eq!(map.pitch_of('k', 0), Some(Pitch::C5));
        assert_eq!(map.pitch_of('q', 0), None);
    }

    #[test]
    fn key_repeat_does_not_retrigger() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();

        assert_eq!(
            console.handle(InputEvent::KeyDown('a'), &mut synth),
            ConsoleAction::Attack(Pitch::C4)
        );
        for _ in 0..5 {
            assert_eq!(
                console.handle(InputEvent::KeyDown('a'), &mut synth),
                ConsoleAction::Ignored
            );
        }
        console.handle(InputEvent::KeyUp('a'), &mut synth);

        assert_eq!(synth.0, vec![Call::Attack(Pitch::C4), Call::Release(Pitch::C4)]);
    }

    #[test]
    fn releasing_an_unpressed_key_is_a_no_op() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();
        assert_eq!(
            console.handle(InputEvent::KeyUp('s'), &mut synth),
            ConsoleAction::Ignored
        );
        assert!(synth.0.is_empty());
    }

    #[test]
    fn octave_shift_applies_to_new_keys_only() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();

        console.handle(InputEvent::KeyDown('a'), &mut synth);
        assert_eq!(
            console.handle(InputEvent::KeyDown('x'), &mut synth),
            ConsoleAction::OctaveShift(1)
        );
        console.handle(InputEvent::KeyDown('d'), &mut synth);
        console.handle(InputEvent::KeyUp('a'), &mut synth);

        assert_eq!(
            synth.0,
            vec![
                Call::Attack(Pitch::C4),
                Call::Attack(pitch("E5")),
                Call::Release(Pitch::C4),
            ]
        );
    }

    #[test]
    fn octave_shift_is_bounded() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();
        for _ in 0..10 {
            console.handle(InputEvent::KeyDown('z'), &mut synth);
        }
        assert_eq!(console.octave(), -MAX_OCTAVE_SHIFT);
    }

    #[test]
    fn pointer_slides_between_keys() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();

        console.handle(InputEvent::PointerDown(Pitch::C4), &mut synth);
        console.handle(InputEvent::PointerDown(Pitch::C4), &mut synth);
        console.handle(InputEvent::PointerDown(Pitch::A4), &mut synth);
        console.handle(InputEvent::PointerLeave, &mut synth);
        console.handle(InputEvent::PointerUp, &mut synth);

        assert_eq!(
            synth.0,
            vec![
                Call::Attack(Pitch::C4),
                Call::Release(Pitch::C4),
                Call::Attack(Pitch::A4),
                Call::Release(Pitch::A4),
            ]
        );
    }

    #[test]
    fn blur_releases_everything_held() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();

        console.handle(InputEvent::KeyDown('a'), &mut synth);
        console.handle(InputEvent::KeyDown('g'), &mut synth);
        console.handle(InputEvent::PointerDown(Pitch::C5), &mut synth);

        assert_eq!(
            console.handle(InputEvent::Blur, &mut synth),
            ConsoleAction::ReleaseAll(vec![Pitch::C4, pitch("G4"), Pitch::C5])
        );
        assert!(console.held_pitches().is_empty());
        assert_eq!(
            console.handle(InputEvent::Blur, &mut synth),
            ConsoleAction::Ignored
        );
    }

    #[test]
    fn shared_pitch_is_released_by_the_last_input() {
        let mut console = SynthConsole::default();
        let mut synth = Calls::default();

        console.handle(InputEvent::KeyDown('a'), &mut synth);
        console.handle(InputEvent::PointerDown(Pitch::C4), &mut synth);
        assert_eq!(
            console.handle(InputEvent::KeyUp('a'), &mut synth),
            ConsoleAction::Ignored
        );
        assert_eq!(
            console.handle(InputEvent::PointerUp, &mut synth),
            ConsoleAction::Release(Pitch::C4)
        );
    }
}
