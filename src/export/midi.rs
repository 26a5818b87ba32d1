//! Standard MIDI file export.
//!
//! Writes a single-track SMF at 480 ticks per quarter with a fixed 120 BPM
//! tempo, so one second of audio is 960 ticks. Note confidence maps onto
//! velocity; overlapping events are serialized in onset order.

use std::path::Path;

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use tracing::info;

use crate::export::ExportError;
use crate::transcribe::NoteEvent;

const TICKS_PER_QUARTER: u16 = 480;
/// Microseconds per quarter note at 120 BPM.
const TEMPO_US: u32 = 500_000;
/// Ticks per second at the fixed tempo.
const TICKS_PER_SEC: f32 = 960.0;

/// Writes the note events as a single-track MIDI file.
///
/// An empty note list still produces a valid file containing only the
/// track name, tempo, and end-of-track meta events.
pub fn write_midi(notes: &[NoteEvent], path: &Path, track_name: &str) -> Result<(), ExportError> {
    let header = Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    );
    let mut smf = Smf::new(header);

    // Flatten to absolute-tick on/off events, then sort so deltas are
    // well-formed even when notes overlap.
    let mut moments: Vec<(u32, TrackEventKind)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let on_tick = (note.onset_secs.max(0.0) * TICKS_PER_SEC).round() as u32;
        let off_tick = on_tick + (note.duration_secs.max(0.0) * TICKS_PER_SEC).round().max(1.0) as u32;
        let key = u7::new(note.midi.min(127));
        let vel = u7::new(1 + (note.confidence.clamp(0.0, 1.0) * 126.0) as u8);
        moments.push((
            on_tick,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn { key, vel },
            },
        ));
        moments.push((
            off_tick,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff { key, vel: u7::new(0) },
            },
        ));
    }
    moments.sort_by_key(|&(tick, _)| tick);

    let mut track = Vec::with_capacity(moments.len() + 3);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(track_name.as_bytes())),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(TEMPO_US))),
    });

    let mut cursor = 0u32;
    for (tick, kind) in moments {
        track.push(TrackEvent {
            delta: u28::new(tick - cursor),
            kind,
        });
        cursor = tick;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    smf.save(path)
        .map_err(|e| ExportError::Midi(e.to_string()))?;
    info!(path = %path.display(), notes = notes.len(), "MIDI exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("tonecraft_midi_{}_{}", std::process::id(), name));
        p
    }

    #[test]
    fn written_file_parses_back_with_all_notes() {
        let notes = vec![
            NoteEvent::from_midi(60, 0.0, 0.5, 0.9),
            NoteEvent::from_midi(64, 0.5, 0.5, 0.8),
            NoteEvent::from_midi(67, 1.0, 0.5, 0.7),
        ];
        let path = temp_path("parse_back.mid");
        write_midi(&notes, &path, "Melody").expect("write midi");

        let bytes = std::fs::read(&path).expect("read back");
        let smf = Smf::parse(&bytes).expect("parse midi");
        assert_eq!(smf.tracks.len(), 1);

        let note_ons = smf.tracks[0]
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count();
        assert_eq!(note_ons, 3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_transcription_still_writes_a_valid_file() {
        let path = temp_path("empty.mid");
        write_midi(&[], &path, "Empty").expect("write midi");
        let bytes = std::fs::read(&path).expect("read back");
        let smf = Smf::parse(&bytes).expect("parse midi");
        assert_eq!(smf.tracks.len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn deltas_accumulate_to_onset_ticks() {
        let notes = vec![NoteEvent::from_midi(69, 1.0, 0.25, 1.0)];
        let path = temp_path("deltas.mid");
        write_midi(&notes, &path, "One").expect("write midi");
        let bytes = std::fs::read(&path).expect("read back");
        let smf = Smf::parse(&bytes).expect("parse midi");

        let mut abs = 0u32;
        let mut on_tick = None;
        for event in &smf.tracks[0] {
            abs += event.delta.as_int();
            if matches!(
                event.kind,
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                }
            ) {
                on_tick = Some(abs);
            }
        }
        assert_eq!(on_tick, Some(960));
        std::fs::remove_file(&path).ok();
    }
}
