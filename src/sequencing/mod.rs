pub mod pattern;
pub mod pitch;
pub mod preset;
pub mod scale;
pub mod sequencer;
pub mod timing;

pub use pattern::Pattern;
pub use pitch::Pitch;
pub use preset::{Preset, PresetLayout, ValidPreset};
pub use scale::Scale;
pub use sequencer::{RowBinding, Sequencer};
pub use timing::{StepUnit, Tempo};
