/// An in-memory audio buffer with interleaved, normalized samples.
///
/// Samples are `f32` in the [-1, 1] range. Length, sample rate and channel
/// count are fixed after creation; effects produce new buffers rather than
/// resizing this one.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples, normalized to [-1, 1].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of audio channels.
    pub channels: u16,
}

impl AudioBuffer {
    /// Creates a buffer from interleaved samples.
    ///
    /// A trailing partial frame (fewer samples than `channels`) is dropped so
    /// the buffer always ends on a frame boundary.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let ch = channels.max(1) as usize;
        let whole = (samples.len() / ch) * ch;
        samples.truncate(whole);
        AudioBuffer {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Creates a silent buffer of `frames` frames.
    pub fn silence(frames: usize, sample_rate: u32, channels: u16) -> Self {
        let ch = channels.max(1);
        AudioBuffer {
            samples: vec![0.0; frames * ch as usize],
            sample_rate,
            channels: ch,
        }
    }

    /// Rebuilds an interleaved buffer from per-channel sample vectors.
    ///
    /// Shorter channels are zero-padded to the longest one.
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: u32) -> Self {
        let ch = channels.len().max(1);
        let frames = channels.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut samples = vec![0.0f32; frames * ch];
        for (c, data) in channels.iter().enumerate() {
            for (f, &s) in data.iter().enumerate() {
                samples[f * ch + c] = s;
            }
        }
        AudioBuffer {
            samples,
            sample_rate,
            channels: ch as u16,
        }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the buffer in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Root-mean-square level across all channels.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum / self.samples.len() as f64).sqrt() as f32
    }

    /// Peak absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()))
    }

    /// De-interleaves one channel into its own vector.
    pub fn channel(&self, ch: usize) -> Vec<f32> {
        let n = self.channels as usize;
        self.samples
            .iter()
            .skip(ch.min(n.saturating_sub(1)))
            .step_by(n)
            .copied()
            .collect()
    }

    /// Averages all channels into a mono sample vector.
    pub fn mono_mix(&self) -> Vec<f32> {
        let ch = self.channels as usize;
        if ch == 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks_exact(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect()
    }

    /// Hard-clips every sample to [-1, 1], mapping NaN to silence.
    pub fn clamped(mut self) -> Self {
        for s in &mut self.samples {
            if s.is_nan() {
                *s = 0.0;
            } else {
                *s = s.clamp(-1.0, 1.0);
            }
        }
        self
    }
}

/// Errors that can occur while loading, processing or saving audio.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or malformed audio file
    #[error("failed to load audio: {0}")]
    Load(String),

    /// A container the engine does not decode or encode itself
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Numerical or algorithmic failure during processing
    #[error("processing error: {0}")]
    Processing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_frame_is_dropped() {
        let buf = AudioBuffer::new(vec![0.1, 0.2, 0.3], 44100, 2);
        assert_eq!(buf.frames(), 1);
        assert_eq!(buf.samples, vec![0.1, 0.2]);
    }

    #[test]
    fn mono_mix_averages_channels() {
        let buf = AudioBuffer::new(vec![1.0, -1.0, 0.5, 0.5], 44100, 2);
        assert_eq!(buf.mono_mix(), vec![0.0, 0.5]);
    }

    #[test]
    fn clamped_bounds_and_scrubs_nan() {
        let buf = AudioBuffer::new(vec![2.0, -3.0, f32::NAN, 0.5], 44100, 1).clamped();
        assert_eq!(buf.samples, vec![1.0, -1.0, 0.0, 0.5]);
    }

    #[test]
    fn rms_of_silence_is_zero() {
        let buf = AudioBuffer::silence(100, 44100, 2);
        assert_eq!(buf.rms(), 0.0);
    }
}
