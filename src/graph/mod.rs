//! Composable building blocks for voices and effect stages.
//!
//! Graph nodes wrap the DSP primitives with what instruments need: note
//! events, block rendering and parameter modulation. `extensions` adds the
//! fluent combinators the percussion kit is written with.

/// Multiply two signals (VCA / ring modulation).
pub mod amplify;
/// Waveshaping with dry/wet.
pub mod distortion;
/// ADSR envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, ...).
pub mod extensions;
/// State-variable filter node.
pub mod filter;
/// Linear blend of two sources.
pub mod mix;
/// Drive node parameters from another signal.
pub mod modulate;
/// Core traits shared by every node.
pub mod node;
/// Audio-rate oscillators and noise.
pub mod oscillator;
/// Schroeder room reverb.
pub mod reverb;
/// Serial chaining (source → processor).
pub mod through;
/// Gain in decibels.
pub mod volume;

pub use node::{GraphNode, RenderCtx};
