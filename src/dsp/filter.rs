use std::f32::consts::TAU;

/*
State-Variable Filter
=====================

A trapezoidal-integrated (topology-preserving) SVF. One update produces all
four responses at once; the caller picks which one to keep.

| type     | passes          | rejects        |
| -------- | --------------- | -------------- |
| lowpass  | below cutoff    | above cutoff   |
| highpass | above cutoff    | below cutoff   |
| bandpass | around cutoff   | both sides     |
| notch    | both sides      | around cutoff  |

Resonance is expressed as Q. The damping coefficient is k = 1/Q:

  Q = 0.5    k = 2.0    no overshoot, soft knee
  Q = 0.707  k = 1.41   Butterworth, maximally flat passband
  Q = 10     k = 0.1    sharp resonant peak at the cutoff

The cutoff is prewarped (g = tan(pi * fc / fs)) so the analog corner lands
on the requested frequency after the bilinear transform, and it is kept below
Nyquist so tan() never blows up.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::LowPass => "lowpass",
            FilterType::HighPass => "highpass",
            FilterType::BandPass => "bandpass",
            FilterType::Notch => "notch",
        }
    }
}

impl std::str::FromStr for FilterType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowpass" => Ok(FilterType::LowPass),
            "highpass" => Ok(FilterType::HighPass),
            "bandpass" => Ok(FilterType::BandPass),
            "notch" => Ok(FilterType::Notch),
            _ => Err(()),
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,
    cutoff_hz: f32,
    q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: cutoff_hz.max(1.0),
            q: Self::DEFAULT_Q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz)
    }

    pub fn notch(cutoff_hz: f32) -> Self {
        Self::new(FilterType::Notch, cutoff_hz)
    }

    #[inline]
    fn coefficient(&self, sample_rate: f32) -> f32 {
        let nyquist_guard = sample_rate * 0.49;
        let fc = self.cutoff_hz.min(nyquist_guard);
        (TAU * 0.5 * fc / sample_rate).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter the buffer in place.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = self.coefficient(sample_rate);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);
            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
                FilterType::BandPass => outputs.bandpass,
                FilterType::Notch => outputs.notch,
            }
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.max(1.0);
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q.max(0.01);
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}
