//! Waveshaping distortion.
//!
//! A waveshaper pushes each sample through a nonlinear transfer function:
//!
//! ```text
//! output = f(input * drive)
//! ```
//!
//! Small drive keeps the signal in the near-linear middle of `f`; larger
//! drive pushes peaks into the curved shoulders and adds harmonics.
//!
//! The effects chain exposes distortion as a single `amount` in `0.0..=1.0`,
//! mapped onto drive by [`amount_to_drive`]:
//!
//! ```text
//! amount 0.0  → drive 1    (gentle saturation only)
//! amount 0.5  → drive ~10
//! amount 1.0  → drive 40   (heavy fuzz)
//! ```
//!
//! The mapping is exponential because loudness of the added harmonics tracks
//! drive roughly logarithmically.

/// Highest drive reachable at `amount == 1.0`.
pub const MAX_DRIVE: f32 = 40.0;

/// Soft clip with the `x / (1 + |x|)` curve. Output never reaches ±1.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Hard clip at ±`threshold`.
#[inline]
pub fn hard_clip(sample: f32, drive: f32, threshold: f32) -> f32 {
    (sample * drive).clamp(-threshold, threshold)
}

#[inline]
pub fn amount_to_drive(amount: f32) -> f32 {
    MAX_DRIVE.powf(amount.clamp(0.0, 1.0))
}

/// Soft clip a buffer in place, compensating so a full-scale input at the
/// given drive comes back out near full scale.
pub fn soft_clip_buffer(buffer: &mut [f32], drive: f32) {
    let makeup = (1.0 + drive) / drive;
    for sample in buffer.iter_mut() {
        *sample = soft_clip(*sample, drive) * makeup;
    }
}
