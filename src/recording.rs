//! Live-input capture accumulator.
//!
//! Recording is the one asynchronous boundary in the engine: a capture
//! callback (owned by the host shell, typically on a device thread) pushes
//! sample chunks through a `CaptureHandle` while the rest of the system is
//! idle. Stopping is the only cancellation point and yields whatever has
//! accumulated so far. Chunks are truncated to whole frames on arrival, so a
//! stopped recording never ends mid-frame.

use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use tracing::debug;

use crate::audio::AudioBuffer;

/// Producer side of a recording, handed to the capture callback.
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    tx: Sender<Vec<f32>>,
    channels: u16,
}

impl CaptureHandle {
    /// Pushes one chunk of interleaved samples.
    ///
    /// Returns false once the recorder has stopped; the callback should
    /// treat that as its signal to unhook.
    pub fn push(&self, chunk: &[f32]) -> bool {
        let ch = self.channels as usize;
        let whole = (chunk.len() / ch) * ch;
        if whole == 0 {
            // Nothing frame-aligned to deliver; the channel state is
            // reported on the next real push.
            return true;
        }
        match self.tx.try_send(chunk[..whole].to_vec()) {
            Ok(()) => true,
            Err(TrySendError::Disconnected(_) | TrySendError::Full(_)) => false,
        }
    }
}

/// Accumulates captured audio between `start` and `stop`.
#[derive(Debug)]
pub struct Recorder {
    sample_rate: u32,
    channels: u16,
    rx: Option<Receiver<Vec<f32>>>,
}

impl Recorder {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Recorder {
            sample_rate,
            channels: channels.max(1),
            rx: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.rx.is_some()
    }

    /// Begins a capture, returning the producer handle.
    ///
    /// Starting while already recording discards the previous accumulator.
    pub fn start(&mut self) -> CaptureHandle {
        let (tx, rx) = unbounded();
        self.rx = Some(rx);
        debug!(
            sample_rate = self.sample_rate,
            channels = self.channels,
            "recording started"
        );
        CaptureHandle {
            tx,
            channels: self.channels,
        }
    }

    /// Stops the capture and returns everything accumulated so far.
    ///
    /// When no recording is active this returns an empty buffer.
    pub fn stop(&mut self) -> AudioBuffer {
        let Some(rx) = self.rx.take() else {
            return AudioBuffer::new(Vec::new(), self.sample_rate, self.channels);
        };
        let mut samples = Vec::new();
        // Producers see the disconnect on their next push; drain whatever
        // arrived before it.
        while let Ok(chunk) = rx.try_recv() {
            samples.extend(chunk);
        }
        debug!(samples = samples.len(), "recording stopped");
        AudioBuffer::new(samples, self.sample_rate, self.channels)
    }
}
