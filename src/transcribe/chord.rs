//! Windowed chroma extraction and chord template matching.
//!
//! Each analysis window is Hann-weighted, transformed, and folded into a
//! 12-bin chroma vector over the tracked frequency range. The chroma is
//! matched against the quality templates for all twelve roots; the best
//! match is emitted when its normalized score clears the detection floor.

use rustfft::{num_complex::Complex, FftPlanner};
use tracing::trace;

use crate::audio::{freq_to_midi, hann_window, MAX_TRACKED_HZ, MIN_TRACKED_HZ};
use crate::transcribe::types::{ChordEvent, ChordQuality};

const WINDOW_SECS: f32 = 1.0;
const HOP_SECS: f32 = 0.5;
/// Best-match scores below this are ambiguous and emitted as nothing.
const SCORE_FLOOR: f32 = 0.55;
/// Windows quieter than this mean-square energy carry no harmony.
const ENERGY_FLOOR: f32 = 1e-6;

/// Detects chords across a mono signal.
pub fn detect_chords(samples: &[f32], sample_rate: u32) -> Vec<ChordEvent> {
    if sample_rate == 0 {
        return Vec::new();
    }
    let window = (WINDOW_SECS * sample_rate as f32) as usize;
    let hop = (HOP_SECS * sample_rate as f32) as usize;
    if window == 0 || samples.len() < window {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(window);
    let hann = hann_window(window);

    let mut chords = Vec::new();
    let mut pos = 0;
    while pos + window <= samples.len() {
        let frame = &samples[pos..pos + window];
        let energy = frame.iter().map(|s| s * s).sum::<f32>() / window as f32;
        if energy >= ENERGY_FLOOR {
            let chroma = chroma_vector(frame, &hann, fft.as_ref(), sample_rate);
            if let Some((root, quality, score)) = best_match(&chroma) {
                trace!(root, score, "chord window matched");
                chords.push(ChordEvent {
                    root,
                    quality,
                    onset_secs: pos as f32 / sample_rate as f32,
                    confidence: score,
                });
            }
        }
        pos += hop;
    }
    chords
}

/// Folds the magnitude spectrum of one window into pitch-class bins.
fn chroma_vector(
    frame: &[f32],
    hann: &[f32],
    fft: &dyn rustfft::Fft<f32>,
    sample_rate: u32,
) -> [f32; 12] {
    let n = frame.len();
    let mut spectrum: Vec<Complex<f32>> = frame
        .iter()
        .zip(hann)
        .map(|(s, w)| Complex::new(s * w, 0.0))
        .collect();
    fft.process(&mut spectrum);

    let mut chroma = [0.0f32; 12];
    let bin_hz = sample_rate as f32 / n as f32;
    for (k, value) in spectrum.iter().enumerate().take(n / 2).skip(1) {
        let freq = k as f32 * bin_hz;
        if !(MIN_TRACKED_HZ..=MAX_TRACKED_HZ).contains(&freq) {
            continue;
        }
        let pc = (freq_to_midi(freq).round() as i32).rem_euclid(12) as usize;
        chroma[pc] += value.norm();
    }
    chroma
}

/// Scores every (root, quality) template against the chroma and returns the
/// best one when it clears the floor.
fn best_match(chroma: &[f32; 12]) -> Option<(u8, ChordQuality, f32)> {
    let total: f32 = chroma.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let mut best: Option<(u8, ChordQuality, f32)> = None;
    for root in 0..12u8 {
        for quality in ChordQuality::ALL {
            let intervals = quality.intervals();
            let mut matched = 0.0;
            let mut present = 0usize;
            for &i in intervals {
                let energy = chroma[(root + i) as usize % 12];
                matched += energy;
                if energy > total * 0.05 {
                    present += 1;
                }
            }
            // Energy inside the template, as a fraction of everything heard,
            // scaled down when template tones are missing so a triad is not
            // out-scored by every seventh chord that contains it.
            let score = (matched / total) * (present as f32 / intervals.len() as f32);
            if score > best.map_or(0.0, |(_, _, s)| s) {
                best = Some((root, quality, score));
            }
        }
    }
    best.filter(|&(_, _, score)| score >= SCORE_FLOOR)
}
