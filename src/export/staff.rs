//! Staff-notation rendering to PNG or SVG.
//!
//! Draws a single treble staff with time flowing left to right: five staff
//! lines, one head per note at its diatonic height, stems and flags for the
//! shorter duration classes, ledger lines outside the staff, and accidental
//! markers beside the head. Chord onsets appear as triangle ticks under the
//! staff. Everything is drawn with primitive shapes, so rendering does not
//! depend on any font being installed.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::export::ExportError;
use crate::transcribe::{Accidental, ChordEvent, NoteEvent};

/// Output image container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffFormat {
    Png,
    Svg,
}

impl StaffFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => Ok(StaffFormat::Png),
            Some("svg") => Ok(StaffFormat::Svg),
            other => Err(ExportError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

const MARGIN_X: i32 = 40;
const PX_PER_SEC: f32 = 100.0;
const LINE_SPACING: i32 = 10;
/// Vertical pixels per diatonic step (half a line spacing).
const STEP_PX: i32 = LINE_SPACING / 2;
/// y of the bottom staff line (E4).
const BOTTOM_LINE_Y: i32 = 120;
/// Diatonic step index of E4, the bottom line of the treble staff.
const BOTTOM_LINE_STEP: i32 = 30;
const HEIGHT: u32 = 200;
const MIN_WIDTH: u32 = 400;
const HEAD_RADIUS: i32 = 4;
const STEM_HEIGHT: i32 = 28;

/// Renders the events to an image file at `path`.
pub fn render_staff(
    notes: &[NoteEvent],
    chords: &[ChordEvent],
    path: &Path,
    format: StaffFormat,
) -> Result<(), ExportError> {
    let end_secs = notes
        .iter()
        .map(|n| n.onset_secs + n.duration_secs)
        .chain(chords.iter().map(|c| c.onset_secs))
        .fold(0.0f32, f32::max);
    let width = ((end_secs * PX_PER_SEC) as u32 + 2 * MARGIN_X as u32).max(MIN_WIDTH);

    match format {
        StaffFormat::Svg => {
            let root = SVGBackend::new(path, (width, HEIGHT)).into_drawing_area();
            draw_staff(&root, notes, chords, width)?;
        }
        StaffFormat::Png => {
            let root = BitMapBackend::new(path, (width, HEIGHT)).into_drawing_area();
            draw_staff(&root, notes, chords, width)?;
        }
    }
    info!(path = %path.display(), notes = notes.len(), "staff image exported");
    Ok(())
}

fn draw_staff<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    notes: &[NoteEvent],
    chords: &[ChordEvent],
    width: u32,
) -> Result<(), ExportError> {
    root.fill(&WHITE).map_err(render_err)?;

    // The five staff lines.
    for line in 0..5 {
        let y = BOTTOM_LINE_Y - line * LINE_SPACING;
        root.draw(&PathElement::new(
            vec![(MARGIN_X, y), (width as i32 - MARGIN_X, y)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_err)?;
    }

    for note in notes {
        draw_note(root, note)?;
    }

    // Chord onsets as ticks under the staff.
    let chord_y = BOTTOM_LINE_Y + 3 * LINE_SPACING;
    for chord in chords {
        let x = MARGIN_X + (chord.onset_secs * PX_PER_SEC) as i32;
        root.draw(&TriangleMarker::new((x, chord_y), 5, BLACK.filled()))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_note<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    note: &NoteEvent,
) -> Result<(), ExportError> {
    let x = MARGIN_X + (note.onset_secs * PX_PER_SEC) as i32;
    let step = diatonic_step(note);
    let y = BOTTOM_LINE_Y - (step - BOTTOM_LINE_STEP) * STEP_PX;
    let class = DurationClass::of(note.duration_secs);

    // Ledger lines for heads above or below the staff.
    let top_line_step = BOTTOM_LINE_STEP + 8;
    let mut ledger = BOTTOM_LINE_STEP - 2;
    while ledger >= step {
        let ly = BOTTOM_LINE_Y - (ledger - BOTTOM_LINE_STEP) * STEP_PX;
        root.draw(&PathElement::new(
            vec![(x - 8, ly), (x + 8, ly)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_err)?;
        ledger -= 2;
    }
    let mut ledger = top_line_step + 2;
    while ledger <= step {
        let ly = BOTTOM_LINE_Y - (ledger - BOTTOM_LINE_STEP) * STEP_PX;
        root.draw(&PathElement::new(
            vec![(x - 8, ly), (x + 8, ly)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_err)?;
        ledger += 2;
    }

    // Head: hollow for whole and half notes, filled otherwise.
    let style = match class {
        DurationClass::Whole | DurationClass::Half => BLACK.stroke_width(2),
        _ => BLACK.filled(),
    };
    root.draw(&Circle::new((x, y), HEAD_RADIUS, style))
        .map_err(render_err)?;

    // Stem and flag.
    if class != DurationClass::Whole {
        let stem_x = x + HEAD_RADIUS;
        root.draw(&PathElement::new(
            vec![(stem_x, y), (stem_x, y - STEM_HEIGHT)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_err)?;
        if class == DurationClass::Eighth {
            root.draw(&PathElement::new(
                vec![(stem_x, y - STEM_HEIGHT), (stem_x + 7, y - STEM_HEIGHT + 10)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_err)?;
        }
    }

    // Accidental marker to the left of the head.
    match note.accidental {
        Accidental::Sharp => {
            root.draw(&Cross::new((x - 12, y), 4, BLACK.stroke_width(1)))
                .map_err(render_err)?;
        }
        Accidental::Flat => {
            root.draw(&TriangleMarker::new((x - 12, y), 4, BLACK.stroke_width(1)))
                .map_err(render_err)?;
        }
        Accidental::Natural => {}
    }
    Ok(())
}

/// Vertical position of a note, counted in scale steps from C-1.
///
/// The accidental does not move the head; C#4 sits on the C4 step and Eb4 on
/// the E4 step, with the accidental drawn as a marker.
fn diatonic_step(note: &NoteEvent) -> i32 {
    let letter = match note.name {
        "C" => 0,
        "D" => 1,
        "E" => 2,
        "F" => 3,
        "G" => 4,
        "A" => 5,
        _ => 6,
    };
    (note.octave + 1) * 7 + letter
}

/// Rough duration classes for head and stem styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DurationClass {
    Whole,
    Half,
    Quarter,
    Eighth,
}

impl DurationClass {
    /// Buckets a duration assuming 120 BPM (a quarter note is half a second).
    fn of(secs: f32) -> Self {
        if secs >= 1.5 {
            DurationClass::Whole
        } else if secs >= 0.75 {
            DurationClass::Half
        } else if secs >= 0.375 {
            DurationClass::Quarter
        } else {
            DurationClass::Eighth
        }
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Render(e.to_string())
}
