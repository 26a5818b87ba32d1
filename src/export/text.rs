//! Plain-text export of a transcription.
//!
//! One line per event: notes as `C4# @ 0.00s (0.50s)` and chords as
//! `C @ 1.00s`, grouped under simple section headers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::export::ExportError;
use crate::transcribe::Transcription;

/// Writes a human-readable listing of the transcription.
pub fn write_text(
    transcription: &Transcription,
    path: &Path,
    track_name: &str,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "{}", track_name)?;
    writeln!(w, "{}", "=".repeat(track_name.len().max(4)))?;
    writeln!(w)?;

    writeln!(w, "Notes ({})", transcription.notes.len())?;
    for note in &transcription.notes {
        writeln!(
            w,
            "  {} @ {:.2}s ({:.2}s)",
            note.label(),
            note.onset_secs,
            note.duration_secs
        )?;
    }

    writeln!(w)?;
    writeln!(w, "Chords ({})", transcription.chords.len())?;
    for chord in &transcription.chords {
        writeln!(w, "  {} @ {:.2}s", chord.label(), chord.onset_secs)?;
    }

    w.flush()?;
    info!(path = %path.display(), "text transcription exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::{ChordEvent, ChordQuality, NoteEvent};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("tonecraft_text_{}_{}", std::process::id(), name));
        p
    }

    #[test]
    fn listing_contains_labels_and_times() {
        let transcription = Transcription {
            notes: vec![
                NoteEvent::from_midi(61, 0.0, 0.5, 0.9),
                NoteEvent::from_midi(69, 0.5, 1.0, 0.8),
            ],
            chords: vec![ChordEvent {
                root: 9,
                quality: ChordQuality::Minor,
                onset_secs: 1.0,
                confidence: 0.8,
            }],
        };
        let path = temp_path("listing.txt");
        write_text(&transcription, &path, "Take 1").expect("write text");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.starts_with("Take 1\n"));
        assert!(content.contains("C4# @ 0.00s (0.50s)"));
        assert!(content.contains("A4 @ 0.50s (1.00s)"));
        assert!(content.contains("Am @ 1.00s"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_transcription_writes_headers_only() {
        let path = temp_path("empty.txt");
        write_text(&Transcription::default(), &path, "Empty").expect("write text");
        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.contains("Notes (0)"));
        assert!(content.contains("Chords (0)"));
        std::fs::remove_file(&path).ok();
    }
}
