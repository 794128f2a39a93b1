//! Voice session integration tests
//!
//! Exercises the state machine against the simulated adapters, no audio
//! hardware required.

use std::sync::Arc;
use std::time::Duration;

use solace_voice::voice::sim::{SimCapture, SimPlayback};
use solace_voice::{
    CaptureErrorKind, CaptureEvent, ConversationMode, PlaybackOptions, PlaybackOutcome,
    SessionState, VoiceSession,
};

mod common;

use common::voice_session;

#[tokio::test]
async fn listening_cycle_reaches_processing() {
    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new());
    session.toggle_voice_mode();

    session.start_listening().unwrap();
    assert_eq!(session.state(), SessionState::Listening);

    session.handle_capture_event(CaptureEvent::Interim("I feel anxious".to_string()));
    session.handle_capture_event(CaptureEvent::Interim(
        "I feel anxious about tomorrow".to_string(),
    ));
    // Later interim results replace, not extend, the buffer
    assert_eq!(session.transcript(), "I feel anxious about tomorrow");

    session.stop_listening().unwrap();
    assert_eq!(session.state(), SessionState::Processing);
    assert_eq!(session.take_transcript(), "I feel anxious about tomorrow");
    assert_eq!(session.transcript(), "");

    session.finish_processing();
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn adapter_ended_event_hands_transcript_off() {
    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new());
    session.toggle_voice_mode();
    session.start_listening().unwrap();
    session.handle_capture_event(CaptureEvent::Interim("good night".to_string()));

    // Recognizer-initiated end of speech, e.g. a silence timeout
    session.handle_capture_event(CaptureEvent::Ended);
    assert_eq!(session.state(), SessionState::Processing);
    assert_eq!(session.transcript(), "good night");
}

#[tokio::test]
async fn start_listening_requires_permission() {
    let session = voice_session(SimCapture::without_permission(), SimPlayback::new());
    session.toggle_voice_mode();

    assert!(session.start_listening().is_err());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.last_error().unwrap().contains("microphone"));
}

#[tokio::test]
async fn permission_denied_event_revokes_permission() {
    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new());
    session.toggle_voice_mode();
    assert!(session.permission_granted());

    session.start_listening().unwrap();
    session.handle_capture_event(CaptureEvent::Error(CaptureErrorKind::PermissionDenied));

    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.permission_granted());
    assert!(session.start_listening().is_err());
}

#[tokio::test]
async fn capture_error_returns_to_idle_with_message() {
    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new());
    session.toggle_voice_mode();
    session.start_listening().unwrap();

    session.handle_capture_event(CaptureEvent::Error(CaptureErrorKind::Recognition));

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.last_error().is_some());

    // A successful listen clears the stale error
    session.start_listening().unwrap();
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn failed_start_keeps_session_idle() {
    let session = voice_session(
        SimCapture::new(Vec::<String>::new()).failing_start(),
        SimPlayback::new(),
    );
    session.toggle_voice_mode();

    assert!(session.start_listening().is_err());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn toggle_cancels_everything_and_clears_buffer() {
    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new());
    session.toggle_voice_mode();
    session.start_listening().unwrap();
    session.handle_capture_event(CaptureEvent::Interim("half a thought".to_string()));

    assert_eq!(session.toggle_voice_mode(), ConversationMode::Text);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.transcript(), "");
}

#[tokio::test]
async fn speaking_completes_and_returns_to_idle() {
    let playback = Arc::new(SimPlayback::new());
    let session = VoiceSession::new(
        Arc::new(SimCapture::new(Vec::<String>::new())),
        Arc::clone(&playback) as Arc<dyn solace_voice::SpeechPlayback>,
        PlaybackOptions::default(),
    );
    session.toggle_voice_mode();

    let outcome = session.speak_text("take a deep breath").await.unwrap();
    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(playback.spoken(), vec!["take a deep breath".to_string()]);
}

#[tokio::test]
async fn newer_utterance_cancels_the_one_in_flight() {
    let playback = Arc::new(SimPlayback::new().with_char_delay(Duration::from_millis(5)));
    let session = Arc::new(VoiceSession::new(
        Arc::new(SimCapture::new(Vec::<String>::new())),
        Arc::clone(&playback) as Arc<dyn solace_voice::SpeechPlayback>,
        PlaybackOptions::default(),
    ));
    session.toggle_voice_mode();

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.speak_text("the first long reply").await })
    };
    // Let the first utterance get in flight before superseding it
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = session.speak_text("the second reply").await.unwrap();

    assert_eq!(first.await.unwrap().unwrap(), PlaybackOutcome::Cancelled);
    assert_eq!(second, PlaybackOutcome::Completed);
    assert_eq!(session.state(), SessionState::Idle);
    // Only the superseding reply played to completion
    assert_eq!(playback.spoken(), vec!["the second reply".to_string()]);
}

#[tokio::test]
async fn stop_speaking_cancels_playback() {
    let playback = Arc::new(SimPlayback::new().with_char_delay(Duration::from_millis(5)));
    let session = Arc::new(VoiceSession::new(
        Arc::new(SimCapture::new(Vec::<String>::new())),
        Arc::clone(&playback) as Arc<dyn solace_voice::SpeechPlayback>,
        PlaybackOptions::default(),
    ));
    session.toggle_voice_mode();

    let speaking = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.speak_text("a reply that gets interrupted").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(session.state(), SessionState::Speaking);

    session.stop_speaking();

    assert_eq!(speaking.await.unwrap().unwrap(), PlaybackOutcome::Cancelled);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(playback.spoken().is_empty());
}

#[tokio::test]
async fn speaking_requires_voice_mode_and_synthesis() {
    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new());
    // Text mode
    assert!(session.speak_text("hello").await.is_err());

    let session = voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::unavailable());
    session.toggle_voice_mode();
    assert!(!session.capabilities().synthesis);
    assert!(session.speak_text("hello").await.is_err());
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn synthesis_failure_records_error_and_idles() {
    let session = voice_session(
        SimCapture::new(Vec::<String>::new()),
        SimPlayback::new().failing(),
    );
    session.toggle_voice_mode();

    assert!(session.speak_text("hello").await.is_err());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn scripted_capture_feeds_buffer_through_event_pump() {
    let capture = SimCapture::new(vec!["hello", "hello there"]);
    let session = voice_session(capture, SimPlayback::new());
    session.toggle_voice_mode();

    session.start_listening().unwrap();
    // Give the pump task a chance to drain the scripted events
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(session.transcript(), "hello there");
}
