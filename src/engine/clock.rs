use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Source of audio-clock time for the transport.
///
/// Scheduling is done against this clock, never against wall time, so
/// triggers land on the same frames the audio thread renders.
pub trait Clock {
    /// Current audio time in seconds.
    fn now(&self) -> f64;

    /// Whether audio output is running. Starting the transport before this is
    /// true is an error.
    fn is_ready(&self) -> bool;
}

/// Frame counter shared with the audio engine.
///
/// The engine advances it after every rendered block; the control thread
/// reads it. Output stays locked until `unlock` is called once the stream is
/// actually playing.
#[derive(Debug, Clone)]
pub struct SampleClock {
    frames: Arc<AtomicU64>,
    ready: Arc<AtomicBool>,
    sample_rate: f32,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            ready: Arc::new(AtomicBool::new(false)),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }

    pub fn unlock(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn lock(&self) {
        self.ready.store(false, Ordering::Release);
    }
}

impl Clock for SampleClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Hand-driven clock for tests and offline rendering. Clones share time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
    ready: Rc<Cell<bool>>,
}

impl ManualClock {
    /// Starts at zero, already unlocked.
    pub fn new() -> Self {
        let clock = Self::default();
        clock.unlock();
        clock
    }

    /// Starts at zero, locked until `unlock`.
    pub fn locked() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.time.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.time.set(self.time.get() + seconds);
    }

    pub fn unlock(&self) {
        self.ready.set(true);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_clock_counts_frames() {
        let clock = SampleClock::new(48_000.0);
        let engine_side = clock.clone();
        assert!(!clock.is_ready());

        engine_side.advance(24_000);
        engine_side.unlock();

        assert_eq!(clock.now(), 0.5);
        assert!(clock.is_ready());
    }

    #[test]
    fn manual_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        other.advance(1.25);
        assert_eq!(clock.now(), 1.25);
        assert!(!ManualClock::locked().is_ready());
    }
}
