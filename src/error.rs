use std::fmt;

/// Errors surfaced by the sequencer core.
///
/// Parameter values outside a declared range are never an error; they are
/// clamped and logged at debug level instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// `start()` was called before the audio clock was unlocked
    AudioNotReady,
    /// A preset failed validation; nothing was applied
    InvalidPreset(PresetError),
    /// A sound or scale identifier did not resolve at construction time
    UnknownInstrument { category: &'static str, name: String },
    /// An effect stage or parameter name did not resolve
    UnknownParameter { stage: String, param: String },
    /// A cell coordinate outside the pattern
    CellOutOfRange {
        row: usize,
        step: usize,
        rows: usize,
        steps: usize,
    },
    /// An instrument slot that does not exist in the rack
    UnknownSlot(usize),
    /// A WAV file could not be decoded
    SampleLoad { path: String, reason: String },
    /// The audio-side command ring had no room for a command
    CommandQueueFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AudioNotReady => write!(
                f,
                "Audio is not ready: unlock the output stream before starting the transport"
            ),
            Error::InvalidPreset(err) => write!(f, "Invalid preset: {}", err),
            Error::UnknownInstrument { category, name } => {
                write!(f, "Unknown {} '{}'", category, name)
            }
            Error::UnknownParameter { stage, param } => {
                write!(f, "Unknown effect parameter '{}.{}'", stage, param)
            }
            Error::CellOutOfRange {
                row,
                step,
                rows,
                steps,
            } => write!(
                f,
                "Cell ({}, {}) is outside the {}x{} pattern",
                row, step, rows, steps
            ),
            Error::UnknownSlot(slot) => write!(f, "No instrument in slot {}", slot),
            Error::SampleLoad { path, reason } => {
                write!(f, "Failed to load sample '{}': {}", path, reason)
            }
            Error::CommandQueueFull => write!(f, "Audio command queue is full"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPreset(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PresetError> for Error {
    fn from(err: PresetError) -> Self {
        Error::InvalidPreset(err)
    }
}

/// Why a preset was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum PresetError {
    /// The JSON document could not be parsed
    Malformed(String),
    /// Tempo outside 60..=200 BPM
    TempoOutOfRange(i64),
    /// Volume outside -40..=0 dB
    VolumeOutOfRange(i64),
    /// Bar count outside 1..=4
    BarsOutOfRange(i64),
    /// Grid has the wrong number of rows
    RowCount {
        grid: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A grid row has the wrong number of steps
    StepCount {
        grid: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::Malformed(reason) => write!(f, "malformed preset: {}", reason),
            PresetError::TempoOutOfRange(bpm) => {
                write!(f, "bpm {} is outside 60..=200", bpm)
            }
            PresetError::VolumeOutOfRange(db) => {
                write!(f, "volume {} dB is outside -40..=0", db)
            }
            PresetError::BarsOutOfRange(bars) => {
                write!(f, "numBars {} is outside 1..=4", bars)
            }
            PresetError::RowCount {
                grid,
                expected,
                actual,
            } => write!(f, "{} has {} rows, expected {}", grid, actual, expected),
            PresetError::StepCount {
                grid,
                row,
                expected,
                actual,
            } => write!(
                f,
                "{} row {} has {} steps, expected {}",
                grid, row, actual, expected
            ),
        }
    }
}

impl std::error::Error for PresetError {}
