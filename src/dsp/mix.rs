//! Mixing, crossfading and gain helpers.
//!
//! Wet/dry blends are linear: `out = dry * (1 - wet) + processed * wet`.
//! Weights sum to one, so a full-scale input never exceeds full scale.

/// Convert decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Add `src` into `dst` sample by sample.
pub fn sum_into(dst: &mut [f32], src: &[f32]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += *s;
    }
}

/// `wet` holds the processed signal on input and the blend on output.
pub fn apply_dry_wet(dry: &[f32], wet: &mut [f32], amount: f32) {
    let amount = amount.clamp(0.0, 1.0);
    let dry_weight = 1.0 - amount;
    for (w, d) in wet.iter_mut().zip(dry) {
        *w = *d * dry_weight + *w * amount;
    }
}

pub fn apply_gain(buffer: &mut [f32], gain: f32) {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}
