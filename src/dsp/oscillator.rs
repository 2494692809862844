use std::f32::consts::TAU;

/*
Phase-Accumulator Oscillator
============================

The oscillator keeps a normalized phase in [0, 1) and advances it by
freq / sample_rate every sample. Each waveform is a function of that phase:

  sine       sin(2π·phase)
  square     +1 for the first half of the cycle, -1 for the second
  sawtooth   2·phase - 1   (ramps up, drops at the wrap)
  triangle   1 - 4·|phase - 0.5|
  noise      uniform random in [-1, 1), phase ignored

Square and sawtooth are naive (not band-limited) and alias at high pitches.
For the register this sequencer plays in that is an acceptable trade.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Noise,
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
        Waveform::Noise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Noise => "noise",
        }
    }
}

impl std::str::FromStr for Waveform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Waveform::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    rng: fastrand::Rng,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            rng: fastrand::Rng::with_seed(0x5eed),
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, freq: f32, sample_rate: f32) -> f32 {
        let phase = self.phase;
        let value = match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Noise => self.rng.f32() * 2.0 - 1.0,
        };

        self.phase += freq / sample_rate;
        self.phase -= self.phase.floor();
        value
    }

    /// Overwrite `out` with the waveform at `freq`.
    pub fn render(&mut self, out: &mut [f32], freq: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(freq, sample_rate);
        }
    }
}
