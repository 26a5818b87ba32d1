//! Destructive effects over whole audio buffers: equalization, pitch
//! correction and the mastering chain.
//!
//! Every effect is a synchronous pure function from one buffer to a new
//! buffer. Advanced algorithm paths are probed once at construction; when a
//! probe fails the effect degrades to a documented basic variant instead of
//! erroring. The `Effect` trait is the invocation surface the session (and
//! any GUI shell) drives; nothing behind it panics or escapes as a panic.

mod equalizer;
mod mastering;
mod naturalize;
mod pitch;

pub use equalizer::{EqMode, Equalizer, ManualEq, SmartEq, EQ_BANDS, EQ_BAND_CENTERS_HZ};
pub use mastering::{
    Compressor, Limiter, MasterMode, MasterPreset, Mastering, MasteringProcessor, OneClickMaster,
    StereoEnhancer,
};
pub use naturalize::Naturalizer;
pub use pitch::{PitchCorrection, PitchCorrector, PitchMode, SmartPitch};

use crate::audio::{AudioBuffer, AudioError};

/// A configured, single-invocation effect.
///
/// Implementations read the input buffer and produce a new one with the same
/// sample rate and channel count. Errors never mutate the input.
pub trait Effect {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Applies the effect, producing a new buffer.
    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer, AudioError>;
}

/// Converts decibels to a linear amplitude factor.
pub(crate) fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Converts a linear amplitude to decibels, floored at -120 dB.
pub(crate) fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
