//! Configuration management for the Solace companion

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::chat::{DEFAULT_FALLBACK_REPLY, DEFAULT_GREETING, DEFAULT_REPLY_TIMEOUT};
use crate::voice::DEFAULT_LANGUAGE;

/// Solace configuration
///
/// Each field resolves env var > config file > default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database lives here)
    pub data_dir: PathBuf,

    /// Voice input/output configuration
    pub voice: VoiceConfig,

    /// Response generation configuration
    pub responder: ResponderConfig,

    /// Opening message for new conversations
    pub greeting: String,

    /// Reply used when generation fails or times out
    pub fallback_reply: String,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// Recognition language (BCP 47 tag)
    pub language: String,

    /// Playback rate multiplier
    pub rate: f32,

    /// Playback pitch multiplier
    pub pitch: f32,

    /// Preferred synthesis voice name
    pub voice_hint: Option<String>,
}

/// Response generation configuration
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Upper bound on a single reply generation
    pub reply_timeout: Duration,

    /// Completion API base URL; `None` selects the offline keyword responder
    pub api_url: Option<String>,

    /// Completion API key
    pub api_key: Option<String>,

    /// Model identifier for chat completions
    pub model: String,

    /// Max completion tokens
    pub max_tokens: u32,
}

impl Config {
    /// Load configuration
    ///
    /// Never fails; missing or malformed sources fall back to defaults.
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();

        let voice = VoiceConfig {
            enabled: std::env::var("SOLACE_VOICE_ENABLED")
                .ok()
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(fc.voice.enabled)
                .unwrap_or(true),
            language: std::env::var("SOLACE_VOICE_LANGUAGE")
                .ok()
                .or(fc.voice.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            rate: std::env::var("SOLACE_VOICE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.voice.rate)
                .unwrap_or(0.9),
            pitch: std::env::var("SOLACE_VOICE_PITCH")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.voice.pitch)
                .unwrap_or(1.0),
            voice_hint: std::env::var("SOLACE_VOICE_HINT")
                .ok()
                .or(fc.voice.voice_hint),
        };

        let responder = ResponderConfig {
            reply_timeout: std::env::var("SOLACE_REPLY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.responder.reply_timeout_secs)
                .map_or(DEFAULT_REPLY_TIMEOUT, Duration::from_secs),
            api_url: std::env::var("SOLACE_API_URL").ok().or(fc.responder.api_url),
            api_key: std::env::var("SOLACE_API_KEY").ok().or(fc.responder.api_key),
            model: std::env::var("SOLACE_MODEL")
                .ok()
                .or(fc.responder.model)
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            max_tokens: std::env::var("SOLACE_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.responder.max_tokens)
                .unwrap_or(512),
        };

        // Data directory (~/.local/share/solace on Linux)
        let data_dir = std::env::var("SOLACE_DATA_DIR").map_or_else(
            |_| {
                directories::BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("solace"))
            },
            PathBuf::from,
        );
        std::fs::create_dir_all(&data_dir).ok();

        let greeting = std::env::var("SOLACE_GREETING")
            .ok()
            .or(fc.chat.greeting)
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());
        let fallback_reply = fc
            .chat
            .fallback_reply
            .unwrap_or_else(|| DEFAULT_FALLBACK_REPLY.to_string());

        Self {
            data_dir,
            voice,
            responder,
            greeting,
            fallback_reply,
        }
    }

    /// Path to the SQLite database file
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("solace.db")
    }
}
