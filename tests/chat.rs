//! Chat session integration tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use solace_voice::db::SessionRepo;
use solace_voice::responder::{KeywordResponder, ResponseGenerator};
use solace_voice::voice::sim::{SimCapture, SimPlayback};
use solace_voice::{
    CaptureEvent, ChatConfig, ChatSession, ChatTranscript, Message, MessageRole,
    PlaybackOptions, Result, VoiceSession,
};

mod common;

use common::{create_test_session, setup_test_db, voice_session};

/// Responder that always errors
struct FailingResponder;

#[async_trait]
impl ResponseGenerator for FailingResponder {
    async fn generate_reply(&self, _context: &[Message]) -> Result<String> {
        Err(solace_voice::Error::ResponseGeneration(
            "service unreachable".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Responder that never finishes within the test timeout
struct StalledResponder;

#[async_trait]
impl ResponseGenerator for StalledResponder {
    async fn generate_reply(&self, _context: &[Message]) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

fn chat_session(responder: Arc<dyn ResponseGenerator>) -> ChatSession {
    ChatSession::new(
        ChatTranscript::new(),
        voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new()),
        responder,
        ChatConfig::default(),
    )
}

#[tokio::test]
async fn greeting_is_preamble_not_visible() {
    let session = chat_session(Arc::new(KeywordResponder::new()));

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript().all()[0].role, MessageRole::System);
    assert_eq!(session.transcript().visible().count(), 0);
}

#[tokio::test]
async fn send_message_appends_user_then_assistant() {
    let mut session = chat_session(Arc::new(KeywordResponder::new()));

    let reply = session.send_message("I'm feeling anxious about work").await;
    assert!(reply.content.contains("anxiety"));

    let visible: Vec<_> = session.transcript().visible().collect();
    assert_eq!(visible.len(), 2);
    assert_eq!(visible[0].role, MessageRole::User);
    assert_eq!(visible[0].content, "I'm feeling anxious about work");
    assert_eq!(visible[1].role, MessageRole::Assistant);
    assert!(!visible[0].is_voice);
}

#[tokio::test]
async fn transcript_keeps_append_order() {
    let mut session = chat_session(Arc::new(KeywordResponder::new()));

    for text in ["first", "second", "third"] {
        session.send_message(text).await;
    }

    let user_turns: Vec<_> = session
        .transcript()
        .visible()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(user_turns, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn failing_responder_yields_exactly_one_fallback() {
    let mut session = chat_session(Arc::new(FailingResponder));

    let reply = session.send_message("hello?").await;
    assert!(reply.content.contains("I'm sorry"));

    let assistant_turns = session
        .transcript()
        .visible()
        .filter(|m| m.role == MessageRole::Assistant)
        .count();
    assert_eq!(assistant_turns, 1);
}

#[tokio::test(start_paused = true)]
async fn stalled_responder_times_out_into_fallback() {
    let mut session = ChatSession::new(
        ChatTranscript::new(),
        voice_session(SimCapture::new(Vec::<String>::new()), SimPlayback::new()),
        Arc::new(StalledResponder),
        ChatConfig {
            reply_timeout: Duration::from_secs(30),
            ..ChatConfig::default()
        },
    );

    let reply = session.send_message("are you there?").await;
    assert!(reply.content.contains("I'm sorry"));
}

#[tokio::test]
async fn voice_turn_is_marked_and_spoken() {
    let playback = Arc::new(SimPlayback::new());
    let voice = VoiceSession::new(
        Arc::new(SimCapture::new(Vec::<String>::new())),
        Arc::clone(&playback) as Arc<dyn solace_voice::SpeechPlayback>,
        PlaybackOptions::default(),
    );
    voice.toggle_voice_mode();

    let mut session = ChatSession::new(
        ChatTranscript::new(),
        voice,
        Arc::new(KeywordResponder::new()),
        ChatConfig::default(),
    );

    session.voice().start_listening().unwrap();
    session
        .voice()
        .handle_capture_event(CaptureEvent::Interim("I can't sleep lately".to_string()));
    session.voice().stop_listening().unwrap();

    let reply = session.submit_transcript().await.unwrap();
    assert!(reply.content.contains("Sleep"));
    assert!(reply.is_voice);
    assert_eq!(playback.spoken(), vec![reply.content.clone()]);

    let user_turn = session
        .transcript()
        .visible()
        .find(|m| m.role == MessageRole::User)
        .unwrap()
        .clone();
    assert!(user_turn.is_voice);
    assert_eq!(user_turn.content, "I can't sleep lately");
}

#[tokio::test]
async fn blank_transcript_is_not_submitted() {
    let mut session = chat_session(Arc::new(KeywordResponder::new()));
    session.voice().toggle_voice_mode();

    session.voice().start_listening().unwrap();
    session
        .voice()
        .handle_capture_event(CaptureEvent::Interim("   ".to_string()));
    session.voice().stop_listening().unwrap();

    assert!(session.submit_transcript().await.is_none());
    assert_eq!(session.transcript().visible().count(), 0);
}

#[tokio::test]
async fn appends_are_mirrored_to_the_session_store() {
    let db = setup_test_db();
    let stored = create_test_session(&db, "test-user");
    let repo = SessionRepo::new(db);

    let mut transcript = ChatTranscript::with_mirror(repo.clone(), &stored.id);
    transcript.append(MessageRole::User, "I had a good day", true);
    transcript.append(MessageRole::Assistant, "I'm glad to hear it", true);

    // Mirroring is fire-and-forget; wait for the background writes to land
    let mut persisted = 0;
    for _ in 0..50 {
        persisted = repo.message_count(&stored.id).unwrap();
        if persisted == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(persisted, 2);

    let messages = repo.messages(&stored.id).unwrap();
    assert_eq!(messages[0].content, "I had a good day");
    assert!(messages[0].is_voice);
    assert_eq!(messages[1].role, MessageRole::Assistant);
}
