// Effect chain integration tests
//
// These tests exercise the effects through the public Effect trait and the
// session boundary, the way a host application drives them: output range
// guarantees, naturalization seed determinism, and graceful degradation on
// inputs the analysis stages cannot handle.


use test_utils::{sine, stereo_tone, SR};
use tonecraft::effects::{
    Effect, EqMode, MasterMode, OneClickMaster, PitchMode, SmartEq, SmartPitch,
};
use tonecraft::{AudioBuffer, AudioSession};

/// Every effect keeps its output inside the valid sample range, even for
/// input that already sits at full scale.
#[test]
fn test_all_effects_bound_output() {
    let hot = AudioBuffer::new(vec![1.0; SR as usize], SR, 1);
    let effects: Vec<Box<dyn Effect>> = vec![
        Box::new(SmartEq {
            mode: EqMode::Bright,
            naturalize: Some(7),
        }),
        Box::new(SmartPitch {
            mode: PitchMode::Aggressive,
            naturalize: Some(7),
        }),
        Box::new(OneClickMaster {
            mode: MasterMode::Loud,
        }),
    ];
    for effect in &effects {
        let out = effect.process(&hot).expect("effect should process");
        assert!(
            out.peak() <= 1.0,
            "{} exceeded full scale: {}",
            effect.name(),
            out.peak()
        );
    }
}

/// The same seed reproduces identical naturalized output; different seeds
/// do not.
#[test]
fn test_naturalization_seed_determinism() {
    let input = sine(440.0, 0.5, 0.4);

    let a = SmartEq {
        mode: EqMode::Vocal,
        naturalize: Some(42),
    }
    .process(&input)
    .expect("eq");
    let b = SmartEq {
        mode: EqMode::Vocal,
        naturalize: Some(42),
    }
    .process(&input)
    .expect("eq");
    assert_eq!(a.samples, b.samples);

    let c = SmartEq {
        mode: EqMode::Vocal,
        naturalize: Some(43),
    }
    .process(&input)
    .expect("eq");
    assert_ne!(a.samples, c.samples);
}

/// A chain of effects applied through the session stays committed step by
/// step, with the backup tracking the previous stage.
#[test]
fn test_effect_chain_through_session() {
    let mut session = AudioSession::from_buffer(stereo_tone(220.0, 440.0, 0.5));

    assert!(session.apply_effect(&SmartEq {
        mode: EqMode::Mix,
        naturalize: Some(1),
    }));
    let after_eq = session.current().clone();

    assert!(session.apply_effect(&OneClickMaster {
        mode: MasterMode::Streaming,
    }));
    assert_eq!(session.backup(), &after_eq);
    assert!(session.current().peak() <= 1.0);
}

/// Input too short for pitch analysis still processes: smart correction
/// degrades to a neutral pass instead of failing.
#[test]
fn test_smart_pitch_degrades_on_short_input() {
    let short = sine(440.0, 0.02, 0.4); // well under one analysis window
    let out = SmartPitch {
        mode: PitchMode::Smart,
        naturalize: None,
    }
    .process(&short)
    .expect("degraded pass");
    assert_eq!(out.samples.len(), short.samples.len());
}

/// Mastering a silent buffer is a no-op rather than a blow-up of the
/// normalization gain.
#[test]
fn test_mastering_silence_stays_silent() {
    let silence = AudioBuffer::silence(SR as usize / 2, SR, 2);
    let out = OneClickMaster {
        mode: MasterMode::Smart,
    }
    .process(&silence)
    .expect("master");
    assert!(out.peak() < 1e-6);
}
