//! Schroeder reverb.
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! Four parallel feedback combs build the decaying tail; two allpasses in
//! series smear the echoes into a dense wash. Comb lengths are mutually
//! prime so their resonances do not stack up on the same frequencies.
//!
//! Delay lines are sized from the sample rate once, at construction. Nothing
//! allocates while processing.

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// Feedback comb with a one-pole lowpass in the loop.
#[derive(Debug, Clone)]
pub struct CombFilter {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.98);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.pos];
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.pos] = input + self.filter_state * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.pos = 0;
    }
}

#[derive(Debug, Clone)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    pos: usize,
    gain: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            gain: 0.5,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = delayed - self.gain * input;
        self.buffer[self.pos] = input + self.gain * output;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

#[derive(Debug, Clone)]
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            combs: COMB_DELAYS_MS.map(|ms| CombFilter::new(ms_to_samples(ms, sample_rate))),
            allpasses: ALLPASS_DELAYS_MS
                .map(|ms| AllpassFilter::new(ms_to_samples(ms, sample_rate))),
        }
    }

    /// Decay length in `0.0..=1.0`. Maps onto comb feedback 0.7..0.98.
    pub fn set_decay(&mut self, decay: f32) {
        let feedback = 0.7 + decay.clamp(0.0, 1.0) * 0.28;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = self.combs.iter_mut().map(|c| c.process(input)).sum::<f32>() * 0.25;
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    pub fn reset(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::reset);
        self.allpasses.iter_mut().for_each(AllpassFilter::reset);
    }
}
