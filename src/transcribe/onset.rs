//! Energy-based note segmentation.
//!
//! Frames the signal, thresholds frame energy against a floor derived from
//! the loudest frame, and merges contiguous above-floor frames into regions.
//! Regions shorter than the minimum note length are discarded as clicks.

use crate::audio::frame_energies;

const FRAME: usize = 1024;
const HOP: usize = 512;
/// Fraction of the loudest frame's energy below which a frame is silence.
const RELATIVE_FLOOR: f32 = 0.05;
/// Hard floor so a near-digital-silence file produces no regions.
const ABSOLUTE_FLOOR: f32 = 1e-6;
/// Regions shorter than this are treated as transients, not notes.
const MIN_REGION_SECS: f32 = 0.05;

/// One sustained region, in sample offsets into the mono signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRegion {
    pub start: usize,
    pub end: usize,
}

impl NoteRegion {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits a mono signal into sustained note regions.
pub fn segment_notes(samples: &[f32], sample_rate: u32) -> Vec<NoteRegion> {
    let energies = frame_energies(samples, FRAME, HOP);
    if energies.is_empty() {
        return Vec::new();
    }

    let max_energy = energies.iter().cloned().fold(0.0f32, f32::max);
    let floor = (max_energy * RELATIVE_FLOOR).max(ABSOLUTE_FLOOR);
    let min_len = (MIN_REGION_SECS * sample_rate as f32) as usize;

    let mut regions = Vec::new();
    let mut open: Option<usize> = None;

    for (i, &energy) in energies.iter().enumerate() {
        if energy >= floor {
            if open.is_none() {
                open = Some(i * HOP);
            }
        } else if let Some(start) = open.take() {
            let end = (i * HOP).min(samples.len());
            if end - start >= min_len {
                regions.push(NoteRegion { start, end });
            }
        }
    }
    if let Some(start) = open {
        let end = samples.len();
        if end - start >= min_len {
            regions.push(NoteRegion { start, end });
        }
    }

    regions
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
    fn silence_yields_no_regions() {
        let regions = segment_notes(&vec![0.0; 44100], 44100);
        assert!(regions.is_empty());
    }

    #[test]
    fn tones_separated_by_silence_become_regions() {
        let sr = 44100;
        let mut samples = tone(440.0, 0.5, sr);
        samples.extend(vec![0.0; sr as usize / 2]);
        samples.extend(tone(550.0, 0.5, sr));

        let regions = segment_notes(&samples, sr);
        assert_eq!(regions.len(), 2);
        assert!(regions[0].start < regions[0].end);
        assert!(regions[1].start >= sr as usize / 2);
    }

    #[test]
    fn clicks_below_minimum_length_are_dropped() {
        let sr = 44100;
        // 10 ms burst, well under the 50 ms minimum.
        let mut samples = vec![0.0; sr as usize / 10];
        samples.extend(tone(440.0, 0.01, sr));
        samples.extend(vec![0.0; sr as usize / 10]);

        let regions = segment_notes(&samples, sr);
        assert!(regions.is_empty());
    }

    #[test]
    fn region_at_signal_end_is_closed() {
        let sr = 44100;
        let mut samples = vec![0.0; sr as usize / 4];
        samples.extend(tone(440.0, 0.5, sr));

        let regions = segment_notes(&samples, sr);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].end <= samples.len());
    }
}
