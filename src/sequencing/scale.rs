use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::sequencing::pitch::Pitch;

/// Number of melody rows every scale fills.
pub const SCALE_ROWS: usize = 8;

/*
Scale Table
===========

Each scale fills the eight melody rows, listed top row first so that row 0
(the top of the grid) is the highest note. All scales are rooted on C4.

  major       C D E F G A B C
  minor       C D Eb F G Ab Bb C
  pentatonic  C D E G A C D E
  blues       C Eb F F# G Bb C Eb
  dorian      C D Eb F G A Bb C
*/

// Semitone offsets from C4, ascending.
const MAJOR: [u8; SCALE_ROWS] = [0, 2, 4, 5, 7, 9, 11, 12];
const MINOR: [u8; SCALE_ROWS] = [0, 2, 3, 5, 7, 8, 10, 12];
const PENTATONIC: [u8; SCALE_ROWS] = [0, 2, 4, 7, 9, 12, 14, 16];
const BLUES: [u8; SCALE_ROWS] = [0, 3, 5, 6, 7, 10, 12, 15];
const DORIAN: [u8; SCALE_ROWS] = [0, 2, 3, 5, 7, 9, 10, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Blues,
    Dorian,
}

impl Scale {
    pub const ALL: [Scale; 5] = [
        Scale::Major,
        Scale::Minor,
        Scale::Pentatonic,
        Scale::Blues,
        Scale::Dorian,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Pentatonic => "pentatonic",
            Scale::Blues => "blues",
            Scale::Dorian => "dorian",
        }
    }

    fn intervals(self) -> &'static [u8; SCALE_ROWS] {
        match self {
            Scale::Major => &MAJOR,
            Scale::Minor => &MINOR,
            Scale::Pentatonic => &PENTATONIC,
            Scale::Blues => &BLUES,
            Scale::Dorian => &DORIAN,
        }
    }

    /// Row pitches, highest first.
    pub fn pitches(self) -> [Pitch; SCALE_ROWS] {
        let intervals = self.intervals();
        std::array::from_fn(|row| {
            Pitch::from_midi(Pitch::C4.midi() + intervals[SCALE_ROWS - 1 - row])
        })
    }

    /// Pitch for a grid row, or `None` past the last row.
    pub fn pitch_of(self, row: usize) -> Option<Pitch> {
        self.pitches().get(row).copied()
    }

    /// Next scale in table order, wrapping around.
    pub fn next(self) -> Scale {
        let index = Scale::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Scale::ALL[(index + 1) % Scale::ALL.len()]
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scale::ALL
            .into_iter()
            .find(|scale| scale.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownInstrument {
                category: "scale",
                name: s.to_string(),
            })
    }
}
