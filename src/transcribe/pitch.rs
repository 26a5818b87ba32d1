//! Per-region pitch labelling.

use tracing::trace;

use crate::audio::{detect_pitch, freq_to_midi, MAX_TRACKED_HZ, MIN_TRACKED_HZ};
use crate::transcribe::onset::NoteRegion;
use crate::transcribe::types::NoteEvent;

/// Regions tracked with less confidence than this are dropped rather than
/// emitted as wrong notes.
const CONFIDENCE_FLOOR: f32 = 0.5;

/// Fraction trimmed from each end of the region before pitch analysis, to
/// skip the attack and release transients.
const EDGE_TRIM: f32 = 0.1;

/// Labels one segmented region with a note, or `None` when the region is
/// unvoiced or tracked too weakly.
pub fn note_from_region(
    samples: &[f32],
    sample_rate: u32,
    region: NoteRegion,
) -> Option<NoteEvent> {
    let trim = (region.len() as f32 * EDGE_TRIM) as usize;
    let start = region.start + trim;
    let end = region.end - trim;
    let interior = &samples[start..end];

    let estimate = detect_pitch(interior, sample_rate, MIN_TRACKED_HZ, MAX_TRACKED_HZ);
    if !estimate.voiced || estimate.confidence < CONFIDENCE_FLOOR {
        trace!(
            start = region.start,
            confidence = estimate.confidence,
            "region dropped as unvoiced"
        );
        return None;
    }

    let midi = freq_to_midi(estimate.frequency).round();
    if !(0.0..=127.0).contains(&midi) {
        return None;
    }

    let sr = sample_rate as f32;
    Some(NoteEvent::from_midi(
        midi as u8,
        region.start as f32 / sr,
        region.len() as f32 / sr,
        estimate.confidence,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, secs: f32, sr: u32) -> Vec<f32> {
        (0..(secs * sr as f32) as usize)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    #[test]
    fn a4_region_becomes_a4_note() {
        let sr = 44100;
        let samples = tone(440.0, 0.5, sr);
        let region = NoteRegion {
            start: 0,
            end: samples.len(),
        };
        let note = note_from_region(&samples, sr, region).expect("voiced region");
        assert_eq!(note.midi, 69);
        assert_eq!(note.label(), "A4");
        assert!((note.duration_secs - 0.5).abs() < 0.01);
    }

    #[test]
    fn noise_region_is_dropped() {
        let sr = 44100;
        let mut state = 0x2545F4914F6CDD1Du64;
        let samples: Vec<f32> = (0..sr as usize / 2)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 33) as f32 / (1u64 << 31) as f32) - 1.0
            })
            .collect();
        let region = NoteRegion {
            start: 0,
            end: samples.len(),
        };
        assert!(note_from_region(&samples, sr, region).is_none());
    }

    #[test]
    fn onset_reflects_region_position() {
        let sr = 44100;
        let mut samples = vec![0.0; sr as usize];
        samples.extend(tone(261.63, 0.5, sr));
        let region = NoteRegion {
            start: sr as usize,
            end: samples.len(),
        };
        let note = note_from_region(&samples, sr, region).expect("voiced region");
        assert!((note.onset_secs - 1.0).abs() < 1e-3);
        assert_eq!(note.label(), "C4");
    }
}
