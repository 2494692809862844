// Instruments sit above the graph layer: voices, polyphony and the
// lookahead event queue that lands triggers on exact frames.

pub mod instrument;
pub mod kind;
pub mod poly;
pub mod rack;
pub mod sample;
pub mod schedule;
pub mod voice;

pub use instrument::{Instrument, InstrumentParam, Rack};
pub use kind::{EnvelopeSettings, InstrumentKind, InstrumentSpec, Polyphony};
pub use poly::Synth;
pub use rack::LocalRack;
pub use sample::{SampleBank, SampleBuffer};
