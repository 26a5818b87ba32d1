/// Accidental of a spelled pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Suffix used in text output ("" / "#" / "b").
    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// Preferred spelling per pitch class, favoring the simpler enharmonic
/// (C# over Db, Eb over D#, and so on).
pub(crate) const PITCH_CLASS_SPELLINGS: [(&str, Accidental); 12] = [
    ("C", Accidental::Natural),
    ("C", Accidental::Sharp),
    ("D", Accidental::Natural),
    ("E", Accidental::Flat),
    ("E", Accidental::Natural),
    ("F", Accidental::Natural),
    ("F", Accidental::Sharp),
    ("G", Accidental::Natural),
    ("A", Accidental::Flat),
    ("A", Accidental::Natural),
    ("B", Accidental::Flat),
    ("B", Accidental::Natural),
];

/// A detected note.
///
/// Events from one analysis run are sorted by onset and non-overlapping
/// within the voice. They are transient: produced by the pipeline, consumed
/// by one exporter call, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Letter name ("C".."B").
    pub name: &'static str,
    pub accidental: Accidental,
    /// Scientific octave (A4 = 440 Hz lives in octave 4).
    pub octave: i32,
    /// MIDI note number, kept for the exporters.
    pub midi: u8,
    /// Onset time in seconds, >= 0.
    pub onset_secs: f32,
    /// Duration in seconds, > 0.
    pub duration_secs: f32,
    /// Tracking stability in [0, 1].
    pub confidence: f32,
}

impl NoteEvent {
    /// Builds an event from a MIDI note number using the preferred spelling.
    pub fn from_midi(
        midi: u8,
        onset_secs: f32,
        duration_secs: f32,
        confidence: f32,
    ) -> Self {
        let (name, accidental) = PITCH_CLASS_SPELLINGS[midi as usize % 12];
        NoteEvent {
            name,
            accidental,
            octave: midi as i32 / 12 - 1,
            midi,
            onset_secs,
            duration_secs,
            confidence,
        }
    }

    /// Display label, e.g. "C4#" (name, octave, accidental).
    pub fn label(&self) -> String {
        format!("{}{}{}", self.name, self.octave, self.accidental.symbol())
    }
}

/// Chord quality recognized by template matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
}

impl ChordQuality {
    /// Chord tones as semitone offsets from the root.
    pub(crate) fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
        }
    }

    pub(crate) const ALL: [ChordQuality; 7] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Dominant7,
    ];
}

/// A detected chord window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    /// Root pitch class, 0 = C.
    pub root: u8,
    pub quality: ChordQuality,
    /// Onset time in seconds; non-decreasing across one run.
    pub onset_secs: f32,
    /// Template-match score in [0, 1], above the detection floor.
    pub confidence: f32,
}

impl ChordEvent {
    /// Display label such as "C", "Am" or "G7".
    pub fn label(&self) -> String {
        let (name, accidental) = PITCH_CLASS_SPELLINGS[self.root as usize % 12];
        format!("{}{}{}", name, accidental.symbol(), self.quality.suffix())
    }
}

/// The symbolic output of one transcription run.
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    /// Notes sorted by onset.
    pub notes: Vec<NoteEvent>,
    /// Chords with non-decreasing onsets.
    pub chords: Vec<ChordEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_spelling() {
        let note = NoteEvent::from_midi(60, 0.0, 1.0, 0.9);
        assert_eq!(note.name, "C");
        assert_eq!(note.accidental, Accidental::Natural);
        assert_eq!(note.octave, 4);
        assert_eq!(note.label(), "C4");
    }

    #[test]
    fn enharmonic_preferences() {
        assert_eq!(NoteEvent::from_midi(61, 0.0, 1.0, 0.9).label(), "C4#");
        assert_eq!(NoteEvent::from_midi(63, 0.0, 1.0, 0.9).label(), "E4b");
        assert_eq!(NoteEvent::from_midi(70, 0.0, 1.0, 0.9).label(), "B4b");
    }

    #[test]
    fn chord_labels() {
        let c = ChordEvent {
            root: 0,
            quality: ChordQuality::Major,
            onset_secs: 0.0,
            confidence: 0.9,
        };
        assert_eq!(c.label(), "C");
        let am7 = ChordEvent {
            root: 9,
            quality: ChordQuality::Minor7,
            onset_secs: 0.0,
            confidence: 0.9,
        };
        assert_eq!(am7.label(), "Am7");
    }
}
