use super::*;
use crate::test_support::BrokenSpeaker;

#[test]
fn check_takes_priority_over_capture() {
    assert_eq!(Cue::select(GameStatus::Check, true), Cue::Check);
    assert_eq!(Cue::select(GameStatus::InProgress, true), Cue::Capture);
    assert_eq!(Cue::select(GameStatus::InProgress, false), Cue::Move);
}

#[test]
fn sound_board_forwards_when_enabled() {
    let log = CueLog::new();
    let mut board = SoundBoard::new(Box::new(log.clone()), true);
    board.fire(Cue::Move);
    board.fire(Cue::Check);
    assert_eq!(log.played(), vec![Cue::Move, Cue::Check]);
}

#[test]
fn toggle_mutes_the_board() {
    let log = CueLog::new();
    let mut board = SoundBoard::new(Box::new(log.clone()), true);
    assert!(!board.toggle());
    board.fire(Cue::Capture);
    assert!(log.played().is_empty());
    assert!(board.toggle());
    board.fire(Cue::Capture);
    assert_eq!(log.played(), vec![Cue::Capture]);
}

#[test]
fn backend_failures_are_swallowed() {
    let mut board = SoundBoard::new(Box::new(BrokenSpeaker), true);
    board.fire(Cue::Move);
    assert!(board.is_enabled());
}

#[test]
fn tones_differ_per_cue() {
    assert_eq!(Cue::Capture.tone().waveform, Waveform::Triangle);
    assert!(Cue::Check.tone().start_hz > Cue::Move.tone().start_hz);
    assert_eq!(Cue::Move.id(), "move");
}
