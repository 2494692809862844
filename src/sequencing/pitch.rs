use std::fmt;
use std::str::FromStr;

/*
Pitch
=====

A pitch is a MIDI note number. Middle C (C4) is 60 and A4 (440 Hz) is 69:

    note = 12 * (octave + 1) + semitone
    freq = 440 * 2^((note - 69) / 12)

Names accept sharps and flats ("C#4", "Db4") and octaves from -1 to 9.
Display always spells with sharps.
*/

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    pub const C2: Pitch = Pitch(36);
    pub const C3: Pitch = Pitch(48);
    pub const C4: Pitch = Pitch(60);
    pub const A4: Pitch = Pitch(69);
    pub const C5: Pitch = Pitch(72);

    /// MIDI note numbers above 127 are clamped.
    pub const fn from_midi(note: u8) -> Self {
        if note > 127 {
            Pitch(127)
        } else {
            Pitch(note)
        }
    }

    pub const fn midi(self) -> u8 {
        self.0
    }

    pub fn frequency(self) -> f32 {
        440.0 * 2.0_f32.powf((self.0 as f32 - 69.0) / 12.0)
    }

    /// Shift by semitones, or `None` outside the MIDI range.
    pub fn transpose(self, semitones: i16) -> Option<Pitch> {
        let note = self.0 as i16 + semitones;
        (0..=127).contains(&note).then(|| Pitch(note as u8))
    }

    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    pub fn is_accidental(self) -> bool {
        NAMES[(self.0 % 12) as usize].len() > 1
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NAMES[(self.0 % 12) as usize], self.octave())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePitchError(pub String);

impl fmt::Display for ParsePitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pitch name '{}'", self.0)
    }
}

impl std::error::Error for ParsePitchError {}

impl FromStr for Pitch {
    type Err = ParsePitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePitchError(s.to_string());
        let mut chars = s.chars();

        let letter = chars.next().ok_or_else(err)?;
        let base: i16 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(err()),
        };

        let rest = chars.as_str();
        let (accidental, octave) = match rest.as_bytes().first() {
            Some(b'#') => (1, &rest[1..]),
            Some(b'b') => (-1, &rest[1..]),
            _ => (0, rest),
        };

        let octave: i16 = octave.parse().map_err(|_| err())?;
        if !(-1..=9).contains(&octave) {
            return Err(err());
        }

        let note = 12 * (octave + 1) + base + accidental;
        if !(0..=127).contains(&note) {
            return Err(err());
        }
        Ok(Pitch(note as u8))
    }
}
