//! Shared test utilities

use std::sync::Arc;

use solace_voice::db::{self, DbPool, Session, SessionRepo};
use solace_voice::voice::sim::{SimCapture, SimPlayback};
use solace_voice::{PlaybackOptions, VoiceSession};

/// Set up an in-memory test database
#[must_use]
#[allow(dead_code)]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Create a test session in the database
#[allow(dead_code)]
pub fn create_test_session(db: &DbPool, user_id: &str) -> Session {
    let repo = SessionRepo::new(db.clone());
    repo.create(user_id, None).expect("failed to create test session")
}

/// Build a voice session over simulated adapters
#[allow(dead_code)]
pub fn voice_session(capture: SimCapture, playback: SimPlayback) -> VoiceSession {
    VoiceSession::new(
        Arc::new(capture),
        Arc::new(playback),
        PlaybackOptions::default(),
    )
}
