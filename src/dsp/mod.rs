//! Low-level DSP primitives used by the graph nodes and instruments.
//!
//! Everything here is allocation-free once constructed, so these types can
//! live directly inside voices and effect stages on the audio thread.

/// Waveshaping transfer functions.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with four responses.
pub mod filter;
/// Gain and wet/dry helpers.
pub mod mix;
/// Phase-accumulator oscillators and noise.
pub mod oscillator;
/// Comb/allpass room simulation.
pub mod reverb;

pub use envelope::{Envelope, EnvelopeState};
pub use oscillator::{Oscillator, Waveform};
