//! Multi-track mixing: an ordered collection of independent tracks summed
//! into a single buffer.
//!
//! Mixdown zero-pads every track to the longest one and sums the unmuted
//! tracks scaled by their gain. No normalization or clip protection happens
//! here; bounding the result before persisting it is the caller's job.
//! Mixdown takes read-only snapshots of the track buffers; tracks must not
//! be mutated while a mixdown is in flight.

use std::path::Path;

use tracing::debug;

use crate::audio::{self, AudioBuffer, AudioError};

pub type TrackId = u64;

/// One track of a mix session.
#[derive(Debug, Clone)]
pub struct Track {
    /// Stable for the lifetime of the track.
    pub id: TrackId,
    pub name: String,
    /// Absent for an empty (just-added) track.
    pub buffer: Option<AudioBuffer>,
    pub muted: bool,
    /// Linear gain applied during mixdown.
    pub gain: f32,
}

/// An ordered collection of tracks sharing a session sample rate.
#[derive(Debug, Default)]
pub struct MixSession {
    tracks: Vec<Track>,
    sample_rate: u32,
    next_id: TrackId,
}

impl MixSession {
    pub fn new(sample_rate: u32) -> Self {
        MixSession {
            tracks: Vec::new(),
            sample_rate,
            next_id: 1,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Adds an empty track and returns its id.
    pub fn add_track(&mut self) -> TrackId {
        let name = format!("Track {}", self.tracks.len() + 1);
        self.add_named_track(name)
    }

    /// Adds an empty track with a display name.
    pub fn add_named_track(&mut self, name: impl Into<String>) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks.push(Track {
            id,
            name: name.into(),
            buffer: None,
            muted: false,
            gain: 1.0,
        });
        id
    }

    /// Removes a track by id. Returns false when no such track exists.
    pub fn remove_track(&mut self, id: TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        self.tracks.len() != before
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Assigns a loaded or recorded buffer to a track.
    pub fn set_buffer(&mut self, id: TrackId, buffer: AudioBuffer) -> bool {
        match self.track_mut(id) {
            Some(t) => {
                t.buffer = Some(buffer);
                true
            }
            None => false,
        }
    }

    pub fn set_muted(&mut self, id: TrackId, muted: bool) -> bool {
        match self.track_mut(id) {
            Some(t) => {
                t.muted = muted;
                true
            }
            None => false,
        }
    }

    pub fn set_gain(&mut self, id: TrackId, gain: f32) -> bool {
        match self.track_mut(id) {
            Some(t) => {
                t.gain = gain.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Sums all unmuted tracks into one buffer.
    ///
    /// Every track is zero-padded to the longest contributing track. The
    /// output channel count is the maximum across contributing tracks; mono
    /// tracks are duplicated to every output channel, other missing channels
    /// stay silent. No downmix and no normalization happen here.
    pub fn mix_down(&self) -> AudioBuffer {
        let contributing: Vec<(&Track, &AudioBuffer)> = self
            .tracks
            .iter()
            .filter(|t| !t.muted)
            .filter_map(|t| t.buffer.as_ref().map(|b| (t, b)))
            .collect();

        let frames = contributing
            .iter()
            .map(|(_, b)| b.frames())
            .max()
            .unwrap_or(0);
        let channels = contributing
            .iter()
            .map(|(_, b)| b.channels)
            .max()
            .unwrap_or(1);

        let mut out = AudioBuffer::silence(frames, self.sample_rate, channels);
        let out_ch = channels as usize;

        for (track, buf) in contributing {
            let src_ch = buf.channels as usize;
            for f in 0..buf.frames() {
                for c in 0..out_ch {
                    let sample = if src_ch == 1 {
                        buf.samples[f]
                    } else if c < src_ch {
                        buf.samples[f * src_ch + c]
                    } else {
                        0.0
                    };
                    out.samples[f * out_ch + c] += sample * track.gain;
                }
            }
        }

        debug!(
            tracks = self.tracks.len(),
            frames, channels, "mixdown complete"
        );
        out
    }

    /// Renders the mixdown and writes it to `path` (WAV).
    ///
    /// The write is staged through a temporary file, so an I/O failure never
    /// leaves a partial project export behind.
    pub fn export_project(&self, path: &Path) -> Result<(), AudioError> {
        let mixed = self.mix_down();
        audio::save(path, &mixed.clamped())
    }
}
