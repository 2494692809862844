pub mod console; // Keyboard / pointer input mapped to an instrument
pub mod dsp;
pub mod effects; // Filter → distortion → reverb → volume chain
pub mod engine; // Clocks, transport and the audio-side mixer
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod sequencing; // Pitches, scales, patterns and presets
pub mod session;
pub mod synth; // Instruments, voices and samples
pub mod voices; // Prebuilt percussion graphs

pub use error::{Error, PresetError};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
