//! Exporters for transcription results: standard MIDI files, rendered staff
//! images (PNG or SVG), and a plain-text note list.
//!
//! Exporters are pure sinks; they never mutate the events they receive and
//! their failures surface as [`ExportError`], not as panics.

mod midi;
mod staff;
mod text;

pub use midi::write_midi;
pub use staff::{render_staff, StaffFormat};
pub use text::write_text;

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("MIDI write failed: {0}")]
    Midi(String),

    #[error("image render failed: {0}")]
    Render(String),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}
