//! Mastering chain: Compressor → Limiter → StereoEnhancer.
//!
//! The three stages always run in that order. The compressor is a
//! feed-forward design with a peak envelope follower and attack/release
//! smoothing; the limiter is a hard ceiling with optional high-frequency
//! protection; the enhancer scales the mid/side difference of stereo
//! material. One-click modes add RMS normalization toward a target loudness
//! after the chain. The final stage clips to [-1, 1]; earlier stages do not.

use tracing::{debug, warn};

use super::{db_to_linear, linear_to_db, Effect};
use crate::audio::{AudioBuffer, AudioError};

/// Epsilon guard for RMS-derived gains.
const RMS_EPSILON: f32 = 1e-10;
/// Largest uniform gain the basic fallback will apply.
const BASIC_GAIN_CAP: f32 = 1.5;

/// A feed-forward dynamics compressor.
#[derive(Debug, Clone)]
pub struct Compressor {
    pub threshold_db: f32,
    /// Compression ratio (4.0 = 4:1).
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Compressor {
    pub fn new(threshold_db: f32, ratio: f32, attack: f32, release: f32) -> Self {
        Compressor {
            threshold_db: threshold_db.clamp(-60.0, 0.0),
            ratio: ratio.clamp(1.0, 20.0),
            attack: attack.clamp(0.0001, 1.0),
            release: release.clamp(0.001, 5.0),
        }
    }

    /// Compresses the buffer in place.
    ///
    /// The envelope follows the per-frame peak across channels so stereo
    /// images do not pump against each other.
    pub fn process(&self, buffer: &mut AudioBuffer) {
        let sr = buffer.sample_rate.max(1) as f32;
        let attack_coef = (-1.0 / (self.attack * sr)).exp();
        let release_coef = (-1.0 / (self.release * sr)).exp();
        let ch = buffer.channels as usize;

        let mut envelope = 0.0f32;
        for frame in buffer.samples.chunks_exact_mut(ch) {
            let level = frame.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            let coef = if level > envelope {
                attack_coef
            } else {
                release_coef
            };
            envelope = coef * envelope + (1.0 - coef) * level;

            let env_db = linear_to_db(envelope);
            let reduction_db = if env_db > self.threshold_db {
                (self.threshold_db - env_db) * (1.0 - 1.0 / self.ratio)
            } else {
                0.0
            };
            let gain = db_to_linear(reduction_db);
            for s in frame.iter_mut() {
                *s *= gain;
            }
        }
    }
}

/// A hard-ceiling peak limiter.
#[derive(Debug, Clone)]
pub struct Limiter {
    pub ceiling_db: f32,
    /// Relax the ceiling slightly for buffers whose energy concentrates
    /// above the protection cutoff, trading a little level for less audible
    /// clipping distortion on bright material.
    pub high_freq_protection: bool,
}

/// Cutoff separating "high-frequency" energy for protection purposes.
const HF_CUTOFF_HZ: f32 = 6000.0;
/// Share of total energy above the cutoff that triggers protection.
const HF_ENERGY_SHARE: f32 = 0.4;
/// Ceiling relaxation when protection engages, in dB.
const HF_RELAX_DB: f32 = 0.5;

impl Limiter {
    pub fn new(ceiling_db: f32, high_freq_protection: bool) -> Self {
        Limiter {
            ceiling_db: ceiling_db.clamp(-20.0, 0.0),
            high_freq_protection,
        }
    }

    /// The effective linear ceiling for this buffer.
    pub fn effective_ceiling(&self, buffer: &AudioBuffer) -> f32 {
        let mut ceiling_db = self.ceiling_db;
        if self.high_freq_protection && hf_energy_share(buffer) > HF_ENERGY_SHARE {
            ceiling_db = (ceiling_db + HF_RELAX_DB).min(0.0);
        }
        db_to_linear(ceiling_db)
    }

    /// Limits the buffer in place so no sample exceeds the ceiling.
    pub fn process(&self, buffer: &mut AudioBuffer) {
        let ceiling = self.effective_ceiling(buffer);
        for s in &mut buffer.samples {
            *s = s.clamp(-ceiling, ceiling);
        }
    }
}

/// Fraction of signal energy above the protection cutoff, estimated with a
/// one-pole lowpass split (high band = input minus lowpassed input).
fn hf_energy_share(buffer: &AudioBuffer) -> f32 {
    if buffer.is_empty() || buffer.sample_rate == 0 {
        return 0.0;
    }
    let sr = buffer.sample_rate as f32;
    let alpha = (-2.0 * std::f32::consts::PI * HF_CUTOFF_HZ / sr).exp();
    let mono = buffer.mono_mix();
    let mut lp = 0.0f32;
    let mut total = 0.0f64;
    let mut high = 0.0f64;
    for &s in &mono {
        lp = alpha * lp + (1.0 - alpha) * s;
        let h = s - lp;
        total += (s as f64) * (s as f64);
        high += (h as f64) * (h as f64);
    }
    if total <= 0.0 {
        0.0
    } else {
        (high / total) as f32
    }
}

/// Mid/side stereo widener.
#[derive(Debug, Clone)]
pub struct StereoEnhancer {
    /// 0 collapses to mono, 1 leaves the image unchanged, >1 widens.
    pub width: f32,
}

impl StereoEnhancer {
    pub fn new(width: f32) -> Self {
        StereoEnhancer {
            width: width.clamp(0.0, 2.0),
        }
    }

    /// Scales the side signal in place. No-op for non-stereo buffers.
    pub fn process(&self, buffer: &mut AudioBuffer) {
        if buffer.channels != 2 {
            return;
        }
        for frame in buffer.samples.chunks_exact_mut(2) {
            let mid = 0.5 * (frame[0] + frame[1]);
            let side = 0.5 * (frame[0] - frame[1]) * self.width;
            frame[0] = mid + side;
            frame[1] = mid - side;
        }
    }
}

/// Parameter bundles for manual mastering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterPreset {
    Balanced,
    Loud,
    Dynamic,
}

impl MasterPreset {
    /// (compressor threshold dB, ratio, limiter ceiling dB, stereo width).
    fn params(self) -> (f32, f32, f32, f32) {
        match self {
            MasterPreset::Balanced => (-20.0, 4.0, -1.0, 1.1),
            MasterPreset::Loud => (-24.0, 6.0, -0.5, 1.2),
            MasterPreset::Dynamic => (-16.0, 2.5, -2.0, 1.0),
        }
    }
}

/// One-click mastering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterMode {
    Smart,
    Loud,
    Dynamic,
    Radio,
    Streaming,
    Vinyl,
}

impl MasterMode {
    /// (chain preset, target RMS, high-frequency protection).
    fn params(self) -> (MasterPreset, f32, bool) {
        match self {
            MasterMode::Smart => (MasterPreset::Balanced, 0.12, true),
            MasterMode::Loud => (MasterPreset::Loud, 0.2, true),
            MasterMode::Dynamic => (MasterPreset::Dynamic, 0.1, false),
            MasterMode::Radio => (MasterPreset::Loud, 0.18, true),
            MasterMode::Streaming => (MasterPreset::Balanced, 0.14, true),
            MasterMode::Vinyl => (MasterPreset::Dynamic, 0.09, true),
        }
    }
}

/// The mastering processor.
///
/// Probes the full chain at construction; when unavailable, one-click
/// mastering degrades to `apply_basic_mastering`.
#[derive(Debug)]
pub struct MasteringProcessor {
    sample_rate: u32,
    chain_available: bool,
}

impl MasteringProcessor {
    pub fn new(sample_rate: u32) -> Self {
        MasteringProcessor {
            sample_rate,
            chain_available: sample_rate > 0,
        }
    }

    /// Runs the full chain with a preset's parameters.
    pub fn process_audio(
        &self,
        buffer: &AudioBuffer,
        preset: MasterPreset,
    ) -> Result<AudioBuffer, AudioError> {
        if !self.chain_available {
            return Err(AudioError::Processing(
                "mastering requires a positive sample rate".into(),
            ));
        }
        let (threshold, ratio, ceiling, width) = preset.params();
        debug!(?preset, threshold, ceiling, width, "mastering chain");
        let mut out = buffer.clone();
        Compressor::new(threshold, ratio, 0.003, 0.25).process(&mut out);
        Limiter::new(ceiling, false).process(&mut out);
        StereoEnhancer::new(width).process(&mut out);
        Ok(out.clamped())
    }

    /// One-click mastering: chain, then RMS normalization toward the mode's
    /// target loudness, bounded by the limiter ceiling.
    ///
    /// Degrades to `apply_basic_mastering` when the chain is unavailable.
    pub fn one_click_master(
        &self,
        buffer: &AudioBuffer,
        mode: MasterMode,
    ) -> Result<AudioBuffer, AudioError> {
        if !self.chain_available {
            warn!("mastering chain unavailable, using basic loudness adjustment");
            return Ok(self.apply_basic_mastering(buffer));
        }

        let (preset, target_rms, hf_protection) = mode.params();
        let (threshold, ratio, ceiling_db, width) = preset.params();
        debug!(?mode, target_rms, "one-click mastering");

        let mut out = buffer.clone();
        Compressor::new(threshold, ratio, 0.003, 0.25).process(&mut out);
        let limiter = Limiter::new(ceiling_db, hf_protection);
        limiter.process(&mut out);
        StereoEnhancer::new(width).process(&mut out);

        // Pull the program toward the target loudness without letting any
        // peak through the ceiling.
        let rms = out.rms();
        if rms > RMS_EPSILON {
            let mut gain = target_rms / (rms + RMS_EPSILON);
            let peak = out.peak();
            if peak > 0.0 {
                gain = gain.min(limiter.effective_ceiling(&out) / peak);
            }
            for s in &mut out.samples {
                *s *= gain;
            }
        }

        Ok(out.clamped())
    }

    /// Crude but safe loudness fallback: one uniform gain toward a fixed
    /// target RMS, capped, then clipped. The epsilon in the denominator keeps
    /// the gain finite for zero-RMS input, which comes back unchanged.
    pub fn apply_basic_mastering(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let target_rms = 0.1;
        let rms = buffer.rms();
        let gain = (target_rms / (rms + RMS_EPSILON)).min(BASIC_GAIN_CAP);
        let mut out = buffer.clone();
        for s in &mut out.samples {
            *s *= gain;
        }
        out.clamped()
    }
}

/// Manual mastering with a parameter preset.
#[derive(Debug, Clone)]
pub struct Mastering {
    pub preset: MasterPreset,
}

impl Effect for Mastering {
    fn name(&self) -> &'static str {
        "mastering"
    }

    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer, AudioError> {
        MasteringProcessor::new(input.sample_rate).process_audio(input, self.preset)
    }
}

/// One-click mastering toward a mode's target loudness.
#[derive(Debug, Clone)]
pub struct OneClickMaster {
    pub mode: MasterMode,
}

impl Effect for OneClickMaster {
    fn name(&self) -> &'static str {
        "one-click-master"
    }

    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer, AudioError> {
        MasteringProcessor::new(input.sample_rate).one_click_master(input, self.mode)
    }
}
