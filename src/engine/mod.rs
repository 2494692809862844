// Timekeeping and the real-time path.
//
//   control thread                         audio thread
//   ──────────────                         ────────────
//   Transport<SampleClock> ── ticks ──→ Sequencer ──→ EngineHandle
//                                                          │ rtrb ring
//                                                          ↓
//   SampleClock  ←──────── frames rendered ─────────── Engine ──→ cpal

pub mod clock;
pub mod command;
pub mod mixer;
pub mod transport;

pub use clock::{Clock, ManualClock, SampleClock};
pub use command::{EngineCommand, EngineHandle, Trigger};
pub use mixer::{channel, Engine};
pub use transport::{Tick, Transport, TransportConfig, TransportState};
