//! Offline audio post-production engine.
//!
//! Everything operates on in-memory [`audio::AudioBuffer`]s of interleaved
//! f32 samples. [`session::AudioSession`] holds the editing state and runs
//! effects across a boolean boundary that never surfaces errors; the effects
//! themselves live in [`effects`]. [`mixer::MixSession`] sums independent
//! tracks, [`recording::Recorder`] accumulates live input, and
//! [`transcribe::TranscriptionPipeline`] turns audio into note and chord
//! events that the [`export`] sinks serialize.

pub mod audio;
pub mod effects;
pub mod export;
pub mod mixer;
pub mod recording;
pub mod session;
pub mod transcribe;

pub use audio::{AudioBuffer, AudioError};
pub use effects::{EqMode, Equalizer, MasterMode, MasteringProcessor, PitchCorrector, PitchMode};
pub use export::ExportError;
pub use mixer::MixSession;
pub use recording::Recorder;
pub use session::AudioSession;
pub use transcribe::TranscriptionPipeline;
