//! Low-level analysis primitives shared by the effects and the
//! transcription pipeline: windowing, frame energy, and a YIN-style
//! autocorrelation pitch estimator.

use std::f32::consts::PI;

/// Default lower bound for fundamental tracking (below the low E of a bass).
pub const MIN_TRACKED_HZ: f32 = 50.0;
/// Default upper bound for fundamental tracking (above a soprano's range).
pub const MAX_TRACKED_HZ: f32 = 2000.0;

/// Result of fundamental-frequency estimation over one window or region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Estimated fundamental frequency in Hz (0.0 when nothing was found).
    pub frequency: f32,
    /// Tracking stability in [0, 1]; higher is more periodic.
    pub confidence: f32,
    /// Whether the content looks pitched rather than silence or noise.
    pub voiced: bool,
}

impl PitchEstimate {
    pub(crate) fn unvoiced() -> Self {
        PitchEstimate {
            frequency: 0.0,
            confidence: 0.0,
            voiced: false,
        }
    }
}

/// Estimates the fundamental frequency of a mono slice.
///
/// Implements the difference-function form of the YIN estimator: a squared
/// difference over candidate lags, cumulative-mean normalization, an absolute
/// threshold dip search, and parabolic refinement of the winning lag.
///
/// # Arguments
/// * `samples` - mono sample slice
/// * `sample_rate` - sample rate in Hz
/// * `min_hz` / `max_hz` - search range for the fundamental
pub fn detect_pitch(samples: &[f32], sample_rate: u32, min_hz: f32, max_hz: f32) -> PitchEstimate {
    let sr = sample_rate as f32;
    if sr <= 0.0 || min_hz <= 0.0 || max_hz <= min_hz {
        return PitchEstimate::unvoiced();
    }

    let min_lag = (sr / max_hz).ceil() as usize;
    let max_lag = (sr / min_hz).floor() as usize;
    if min_lag == 0 || samples.len() < max_lag * 2 {
        return PitchEstimate::unvoiced();
    }

    let window = max_lag.min(samples.len() / 2);

    // Squared difference function over candidate lags.
    let mut diff = vec![0.0f32; window + 1];
    for lag in 1..=window {
        let mut sum = 0.0f32;
        for i in 0..window {
            let d = samples[i] - samples[i + lag];
            sum += d * d;
        }
        diff[lag] = sum;
    }

    // Cumulative mean normalized difference.
    let mut cmnd = vec![1.0f32; window + 1];
    let mut running = 0.0f32;
    for lag in 1..=window {
        running += diff[lag];
        if running > 0.0 {
            cmnd[lag] = diff[lag] * lag as f32 / running;
        }
    }

    // First dip below the threshold wins; otherwise fall back to the
    // global minimum over the search range.
    let threshold = 0.15;
    let hi = window.min(max_lag);
    let mut best_lag = 0usize;
    let mut best_val = 1.0f32;
    for lag in min_lag..=hi {
        if cmnd[lag] < threshold {
            let mut l = lag;
            while l + 1 <= hi && cmnd[l + 1] < cmnd[l] {
                l += 1;
            }
            best_lag = l;
            best_val = cmnd[l];
            break;
        }
    }
    if best_lag == 0 {
        for lag in min_lag..=hi {
            if cmnd[lag] < best_val {
                best_val = cmnd[lag];
                best_lag = lag;
            }
        }
    }
    if best_lag == 0 {
        return PitchEstimate::unvoiced();
    }

    // Parabolic interpolation for sub-sample lag accuracy.
    let refined = if best_lag > 0 && best_lag < window {
        let alpha = cmnd[best_lag - 1];
        let beta = cmnd[best_lag];
        let gamma = cmnd[best_lag + 1];
        let denom = alpha - 2.0 * beta + gamma;
        if denom.abs() > 1e-12 {
            best_lag as f32 + 0.5 * (alpha - gamma) / denom
        } else {
            best_lag as f32
        }
    } else {
        best_lag as f32
    };

    let frequency = sr / refined;
    let confidence = (1.0 - best_val).clamp(0.0, 1.0);

    PitchEstimate {
        frequency,
        confidence,
        voiced: confidence >= 0.5,
    }
}

/// Converts a frequency to a fractional MIDI note number (A4 = 69).
pub fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * (freq / 440.0).log2()
}

/// Converts a (possibly fractional) MIDI note number to a frequency.
pub fn midi_to_freq(midi: f32) -> f32 {
    440.0 * 2.0f32.powf((midi - 69.0) / 12.0)
}

/// The Hann window: w(n) = 0.5 * (1 - cos(2π*n/(N-1))).
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (len - 1) as f32).cos()))
        .collect()
}

/// Mean-square energy of successive frames (`frame` samples every `hop`).
pub fn frame_energies(samples: &[f32], frame: usize, hop: usize) -> Vec<f32> {
    if frame == 0 || hop == 0 || samples.len() < frame {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(samples.len() / hop + 1);
    let mut start = 0;
    while start + frame <= samples.len() {
        let e: f32 = samples[start..start + frame].iter().map(|s| s * s).sum();
        out.push(e / frame as f32);
        start += hop;
    }
    out
}
