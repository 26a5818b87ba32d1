//! The editing session: three buffer slots and the effect boundary.
//!
//! `original` is set once on load and never mutated. `backup` receives a
//! copy of `current` immediately before every effect application, enabling
//! before/after comparison and one-step revert. `current` is the live
//! working buffer. Callers must not run two operations on one session
//! concurrently; there is no internal locking.

use std::path::Path;

use tracing::{debug, warn};

use crate::audio::{self, AudioBuffer, AudioError};
use crate::effects::Effect;

#[derive(Debug, Clone)]
pub struct AudioSession {
    original: AudioBuffer,
    backup: AudioBuffer,
    current: AudioBuffer,
}

impl AudioSession {
    /// Loads an audio file and seeds all three slots from it.
    pub fn load(path: &Path) -> Result<Self, AudioError> {
        let buffer = audio::load(path)?;
        debug!(
            path = %path.display(),
            frames = buffer.frames(),
            sample_rate = buffer.sample_rate,
            channels = buffer.channels,
            "session loaded"
        );
        Ok(Self::from_buffer(buffer))
    }

    /// Starts a session from an in-memory buffer (recorded or mixed audio).
    pub fn from_buffer(buffer: AudioBuffer) -> Self {
        AudioSession {
            original: buffer.clone(),
            backup: buffer.clone(),
            current: buffer,
        }
    }

    /// The live working buffer.
    pub fn current(&self) -> &AudioBuffer {
        &self.current
    }

    /// The untouched buffer from load time.
    pub fn original(&self) -> &AudioBuffer {
        &self.original
    }

    /// The snapshot taken before the most recent effect.
    pub fn backup(&self) -> &AudioBuffer {
        &self.backup
    }

    /// Whether any effect has changed the working buffer since load.
    pub fn is_modified(&self) -> bool {
        self.current != self.original
    }

    /// Applies an effect across the boolean boundary.
    ///
    /// Snapshots `current` into `backup`, runs the effect, and commits the
    /// result only on success. On failure the working buffer is left exactly
    /// as it was and `false` is returned; no error escapes this boundary.
    pub fn apply_effect(&mut self, effect: &dyn Effect) -> bool {
        self.backup = self.current.clone();
        match effect.process(&self.current) {
            Ok(output) => {
                debug!(effect = effect.name(), "effect applied");
                self.current = output;
                true
            }
            Err(e) => {
                warn!(effect = effect.name(), error = %e, "effect failed, buffer unchanged");
                false
            }
        }
    }

    /// Restores the pre-effect snapshot.
    pub fn revert(&mut self) {
        self.current = self.backup.clone();
    }

    /// Restores the buffer from load time and clears the backup.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.backup = self.original.clone();
    }

    /// Saves the working buffer through the container contract.
    pub fn save(&self, path: &Path) -> Result<(), AudioError> {
        audio::save(path, &self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{MasterMode, OneClickMaster, PitchCorrection};

    fn session() -> AudioSession {
        let samples: Vec<f32> = (0..8820)
            .map(|i| 0.4 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        AudioSession::from_buffer(AudioBuffer::new(samples, 44100, 1))
    }

    #[test]
    fn backup_snapshots_before_each_effect() {
        let mut s = session();
        let before = s.current().clone();
        assert!(s.apply_effect(&OneClickMaster {
            mode: MasterMode::Loud
        }));
        assert_eq!(s.backup(), &before);
        assert!(s.is_modified());
    }

    #[test]
    fn revert_restores_pre_effect_state() {
        let mut s = session();
        let before = s.current().clone();
        s.apply_effect(&OneClickMaster {
            mode: MasterMode::Loud,
        });
        s.revert();
        assert_eq!(s.current(), &before);
    }

    #[test]
    fn reset_restores_load_state() {
        let mut s = session();
        s.apply_effect(&OneClickMaster {
            mode: MasterMode::Loud,
        });
        s.apply_effect(&PitchCorrection {
            semitone_shift: 0.0,
            strength: 0.3,
        });
        s.reset();
        assert!(!s.is_modified());
    }

    #[test]
    fn original_is_never_mutated() {
        let mut s = session();
        let original = s.original().clone();
        s.apply_effect(&OneClickMaster {
            mode: MasterMode::Radio,
        });
        assert_eq!(s.original(), &original);
    }
}
