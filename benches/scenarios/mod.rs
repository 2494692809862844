//! Benchmarks for the paths the sequencer actually runs every block.

mod session;
mod synth;

pub use session::bench_session;
pub use synth::{bench_chain, bench_synth};
