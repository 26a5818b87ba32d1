// Session and file round-trip tests
//
// These tests exercise the editing session end to end: loading and saving
// WAV files through the container contract, the boolean effect boundary,
// and the backup/revert/reset slot semantics.


use std::path::Path;

use test_utils::{sine, stereo_tone, temp_path, SR};
use tonecraft::audio;
use tonecraft::effects::{EqMode, MasterMode, OneClickMaster, SmartEq};
use tonecraft::{AudioError, AudioSession};

/// Saving and reloading a buffer preserves the format and the samples.
///
/// Output is written as 32-bit float WAV, so the round trip is exact.
#[test]
fn test_wav_round_trip() {
    let buffer = stereo_tone(440.0, 660.0, 0.5);
    let path = temp_path("round_trip.wav");

    audio::save(&path, &buffer).expect("save wav");
    let reloaded = audio::load(&path).expect("reload wav");

    assert_eq!(reloaded.sample_rate, SR);
    assert_eq!(reloaded.channels, 2);
    assert_eq!(reloaded.samples.len(), buffer.samples.len());
    for (a, b) in buffer.samples.iter().zip(&reloaded.samples) {
        assert_eq!(a, b);
    }
    std::fs::remove_file(&path).ok();
}

/// Unsupported containers are rejected at the contract boundary rather
/// than being probed and failing somewhere deeper.
#[test]
fn test_unsupported_container_is_rejected() {
    let result = audio::load(Path::new("input.flac"));
    assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));

    let buffer = sine(440.0, 0.1, 0.4);
    let result = audio::save(Path::new("output.mp3"), &buffer);
    assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));
}

/// A failed save never leaves a partial file at the destination.
#[test]
fn test_staged_save_leaves_no_partial_file() {
    let buffer = sine(440.0, 0.1, 0.4);
    let path = temp_path("no_such_dir").join("out.wav");
    assert!(audio::save(&path, &buffer).is_err());
    assert!(!path.exists());
}

/// The full edit cycle: load, apply, save, reload.
#[test]
fn test_session_edit_cycle() {
    let input_path = temp_path("cycle_in.wav");
    let output_path = temp_path("cycle_out.wav");
    audio::save(&input_path, &sine(440.0, 1.0, 0.4)).expect("save input");

    let mut session = AudioSession::load(&input_path).expect("load session");
    assert!(!session.is_modified());

    let applied = session.apply_effect(&OneClickMaster {
        mode: MasterMode::Smart,
    });
    assert!(applied);
    assert!(session.is_modified());

    session.save(&output_path).expect("save output");
    let reloaded = audio::load(&output_path).expect("reload output");
    assert_eq!(reloaded.samples.len(), session.current().samples.len());

    // Mastered output stays within the valid range.
    assert!(reloaded.peak() <= 1.0);

    std::fs::remove_file(&input_path).ok();
    std::fs::remove_file(&output_path).ok();
}

/// Backup always holds the state from just before the most recent effect,
/// and revert restores it.
#[test]
fn test_backup_and_revert_across_effects() {
    let mut session = AudioSession::from_buffer(sine(440.0, 0.5, 0.4));

    session.apply_effect(&SmartEq {
        mode: EqMode::Bright,
        naturalize: None,
    });
    let after_eq = session.current().clone();

    session.apply_effect(&OneClickMaster {
        mode: MasterMode::Loud,
    });
    assert_eq!(session.backup(), &after_eq);

    session.revert();
    assert_eq!(session.current(), &after_eq);

    session.reset();
    assert!(!session.is_modified());
}
