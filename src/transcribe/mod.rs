//! Audio-to-symbolic transcription.
//!
//! The pipeline runs three read-only analysis stages over a mono mix of the
//! input: energy segmentation into note regions, per-region pitch labelling,
//! and windowed chroma matching for chords. The output is a [`Transcription`]
//! that the exporters consume.

mod chord;
mod onset;
mod pitch;
mod types;

pub use types::{Accidental, ChordEvent, ChordQuality, NoteEvent, Transcription};

use tracing::info;

use crate::audio::AudioBuffer;

/// Converts audio into note and chord events.
///
/// Construction is infallible and the pipeline holds no state between runs,
/// so one instance can serve any number of buffers.
#[derive(Debug, Default)]
pub struct TranscriptionPipeline;

impl TranscriptionPipeline {
    pub fn new() -> Self {
        TranscriptionPipeline
    }

    /// Runs the full analysis over a buffer.
    ///
    /// Multi-channel input is mixed down to mono first; analysis never
    /// modifies the buffer. Silence or unpitched input yields an empty
    /// transcription, never an error.
    pub fn transcribe(&self, buffer: &AudioBuffer) -> Transcription {
        if buffer.is_empty() || buffer.sample_rate == 0 {
            return Transcription::default();
        }
        let mono = buffer.mono_mix();
        let sr = buffer.sample_rate;

        let mut notes: Vec<NoteEvent> = onset::segment_notes(&mono, sr)
            .into_iter()
            .filter_map(|region| pitch::note_from_region(&mono, sr, region))
            .collect();
        notes.sort_by(|a, b| a.onset_secs.total_cmp(&b.onset_secs));

        let chords = chord::detect_chords(&mono, sr);

        info!(
            notes = notes.len(),
            chords = chords.len(),
            "transcription complete"
        );
        Transcription { notes, chords }
    }
}
