//! Solace Voice - voice session engine for an AI wellness companion
//!
//! This library provides the core of the Solace companion:
//! - The voice session state machine (idle / listening / processing / speaking)
//! - Speech capture and playback adapter interfaces
//! - The append-only chat transcript with best-effort persistence
//! - Response generation (keyword placeholder and HTTP-backed)
//! - Session, journal, and mood storage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Chat view (owner)                   │
//! │        CLI  │  app shell  │  ...                    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  ChatSession                         │
//! │   VoiceSession  │  Transcript  │  Responder         │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   Capture / Playback adapters   │   SQLite store    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod responder;
pub mod voice;

pub use chat::{ChatConfig, ChatSession, ChatTranscript, Message, MessageRole};
pub use config::Config;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use responder::{HttpResponder, KeywordResponder, ResponseGenerator};
pub use voice::{
    Capabilities, CaptureConfig, CaptureErrorKind, CaptureEvent, ConversationMode,
    PlaybackOptions, PlaybackOutcome, SessionState, SpeechCapture, SpeechPlayback, VoiceSession,
};
