//! Pitch correction.
//!
//! The corrector tracks the fundamental over short overlapping Hann windows,
//! quantizes each tracked frequency to the nearest equal-tempered semitone
//! (optionally offset for global key shifting), resynthesizes each window
//! with a granular resample at the target ratio, and blends dry against
//! corrected per window by the correction strength. Unvoiced windows pass
//! through untouched.

use tracing::{debug, warn};

use super::naturalize::Naturalizer;
use super::Effect;
use crate::audio::{
    detect_pitch, freq_to_midi, hann_window, midi_to_freq, AudioBuffer, AudioError,
    MAX_TRACKED_HZ, MIN_TRACKED_HZ,
};

/// Analysis window length in samples.
const WINDOW: usize = 2048;
/// Hop between analysis windows.
const HOP: usize = 512;
/// Windows tracking below this confidence are treated as unvoiced.
const VOICED_FLOOR: f32 = 0.6;

/// One-click correction modes: (strength, expression intensity).
///
/// Expression intensity is the fraction of the performer's natural pitch
/// deviation that naturalization deliberately retains instead of correcting
/// away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchMode {
    Smart,
    Aggressive,
    Gentle,
    Adaptive,
}

impl PitchMode {
    pub fn params(self) -> (f32, f32) {
        match self {
            PitchMode::Smart => (0.7, 0.4),
            PitchMode::Aggressive => (0.9, 0.3),
            PitchMode::Gentle => (0.5, 0.6),
            PitchMode::Adaptive => (0.7, 0.5),
        }
    }
}

/// Semitone-quantized pitch corrector.
#[derive(Debug)]
pub struct PitchCorrector {
    window: usize,
    hop: usize,
}

impl Default for PitchCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchCorrector {
    pub fn new() -> Self {
        PitchCorrector {
            window: WINDOW,
            hop: HOP,
        }
    }

    /// Corrects pitch toward the nearest semitone.
    ///
    /// * `semitone_shift` - global offset added to every quantized target,
    ///   turning correction into key shifting when nonzero.
    /// * `strength` - 0 leaves the buffer untouched, 1 snaps fully onto the
    ///   target; values in between blend linearly per window.
    pub fn correct(
        &self,
        buffer: &AudioBuffer,
        semitone_shift: f32,
        strength: f32,
    ) -> Result<AudioBuffer, AudioError> {
        let strength = strength.clamp(0.0, 1.0);
        if strength == 0.0 || buffer.is_empty() {
            return Ok(buffer.clone());
        }
        self.run(buffer, semitone_shift, strength, None)
    }

    /// One-click correction with a mode preset and optional naturalization.
    ///
    /// With a naturalization seed, a controlled fraction of the source's
    /// natural pitch deviation is retained in proportion to the mode's
    /// expression intensity, so vibrato and micro-drift survive instead of
    /// being flattened into a mechanically perfect line.
    ///
    /// Degrades to `correct(0, 0.5)` when the buffer is too short for the
    /// windowed analysis path.
    pub fn smart_correct(
        &self,
        buffer: &AudioBuffer,
        mode: PitchMode,
        naturalize: Option<u64>,
    ) -> Result<AudioBuffer, AudioError> {
        let (strength, expression) = mode.params();
        if buffer.frames() < self.window * 2 {
            warn!("windowed pitch analysis unavailable, using basic correction");
            return self.correct(buffer, 0.0, 0.5);
        }
        debug!(?mode, strength, expression, "smart pitch correction");
        match naturalize {
            Some(seed) => self.run(buffer, 0.0, strength, Some((expression, seed))),
            None => self.run(buffer, 0.0, strength, None),
        }
    }

    fn run(
        &self,
        buffer: &AudioBuffer,
        semitone_shift: f32,
        strength: f32,
        expression: Option<(f32, u64)>,
    ) -> Result<AudioBuffer, AudioError> {
        let sr = buffer.sample_rate;
        if sr == 0 {
            return Err(AudioError::Processing(
                "pitch correction requires a positive sample rate".into(),
            ));
        }

        let hann = hann_window(self.window);
        let mut naturalizer = expression.map(|(intensity, seed)| {
            (intensity, Naturalizer::with_seed(seed))
        });

        let mut out_channels = Vec::with_capacity(buffer.channels as usize);
        for ch in 0..buffer.channels as usize {
            let input = buffer.channel(ch);
            let n = input.len();
            let mut acc = vec![0.0f32; n];
            let mut weight = vec![0.0f32; n];

            let mut start = 0;
            while start < n {
                let end = (start + self.window).min(n);
                let frame = &input[start..end];

                let target = self.window_target(frame, sr, semitone_shift);
                let eff_strength = match (target, naturalizer.as_mut()) {
                    (None, _) => 0.0, // unvoiced: pass through
                    (Some(_), Some((intensity, rng))) => {
                        // Retain a jittered share of the natural deviation.
                        let retained = (*intensity * (0.75 + rng.jitter(0.25))).clamp(0.0, 1.0);
                        strength * (1.0 - retained)
                    }
                    (Some(_), None) => strength,
                };
                let ratio = target.unwrap_or(1.0);

                for i in 0..frame.len() {
                    let w = hann[i];
                    let dry = frame[i];
                    let wet = if eff_strength > 0.0 {
                        resample_at(frame, i as f32 * ratio)
                    } else {
                        dry
                    };
                    let blended = dry * (1.0 - eff_strength) + wet * eff_strength;
                    acc[start + i] += blended * w;
                    weight[start + i] += w;
                }

                start += self.hop;
            }

            // Normalize the overlap-add envelope.
            for i in 0..n {
                if weight[i] > 1e-6 {
                    acc[i] /= weight[i];
                } else {
                    acc[i] = input[i];
                }
            }
            out_channels.push(acc);
        }

        Ok(AudioBuffer::from_channels(&out_channels, sr).clamped())
    }

    /// Target resample ratio for one window, or `None` when unvoiced.
    fn window_target(&self, frame: &[f32], sample_rate: u32, shift: f32) -> Option<f32> {
        let est = detect_pitch(frame, sample_rate, MIN_TRACKED_HZ, MAX_TRACKED_HZ);
        if !est.voiced || est.confidence < VOICED_FLOOR || est.frequency <= 0.0 {
            return None;
        }
        let midi = freq_to_midi(est.frequency);
        let target = midi.round() + shift;
        let ratio = midi_to_freq(target) / est.frequency;
        // Reject implausible jumps from octave errors in the tracker.
        if !(0.5..=2.0).contains(&ratio) {
            return None;
        }
        Some(ratio)
    }
}

/// Linear-interpolation read of `frame` at fractional position `pos`,
/// clamped to the frame edge.
fn resample_at(frame: &[f32], pos: f32) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let last = frame.len() - 1;
    if pos <= 0.0 {
        return frame[0];
    }
    if pos >= last as f32 {
        return frame[last];
    }
    let i = pos as usize;
    let frac = pos - i as f32;
    frame[i] * (1.0 - frac) + frame[i + 1] * frac
}

/// Manual pitch correction with explicit shift and strength.
#[derive(Debug, Clone)]
pub struct PitchCorrection {
    pub semitone_shift: f32,
    pub strength: f32,
}

impl Effect for PitchCorrection {
    fn name(&self) -> &'static str {
        "pitch-correction"
    }

    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer, AudioError> {
        PitchCorrector::new().correct(input, self.semitone_shift, self.strength)
    }
}

/// One-click pitch correction with a mode preset.
#[derive(Debug, Clone)]
pub struct SmartPitch {
    pub mode: PitchMode,
    /// Naturalization seed; `None` disables expression retention.
    pub naturalize: Option<u64>,
}

impl Effect for SmartPitch {
    fn name(&self) -> &'static str {
        "smart-pitch"
    }

    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer, AudioError> {
        PitchCorrector::new().smart_correct(input, self.mode, self.naturalize)
    }
}
