/// Audio foundation: the buffer model, the file load/save contract, and the
/// analysis primitives the effects and the transcription pipeline share.
mod analysis;
mod types;
mod wav;

pub use analysis::{
    detect_pitch, frame_energies, freq_to_midi, hann_window, midi_to_freq, PitchEstimate,
    MAX_TRACKED_HZ, MIN_TRACKED_HZ,
};
pub use types::{AudioBuffer, AudioError};
pub use wav::{load, read_wav_file, save, write_wav_file};
