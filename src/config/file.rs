//! TOML configuration file loading
//!
//! Supports `~/.config/solace/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SolaceConfigFile {
    /// Voice input/output configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Response generation configuration
    #[serde(default)]
    pub responder: ResponderFileConfig,

    /// Conversation wording overrides
    #[serde(default)]
    pub chat: ChatFileConfig,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// Recognition language (BCP 47 tag, e.g. "en-US")
    pub language: Option<String>,

    /// Playback rate multiplier
    pub rate: Option<f32>,

    /// Playback pitch multiplier
    pub pitch: Option<f32>,

    /// Preferred synthesis voice name
    pub voice_hint: Option<String>,
}

/// Response generation configuration
#[derive(Debug, Default, Deserialize)]
pub struct ResponderFileConfig {
    /// Reply generation timeout in seconds
    pub reply_timeout_secs: Option<u64>,

    /// Completion API base URL; unset means the keyword responder
    pub api_url: Option<String>,

    /// Completion API key
    pub api_key: Option<String>,

    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// Max completion tokens
    pub max_tokens: Option<u32>,
}

/// Conversation wording overrides
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// Opening message
    pub greeting: Option<String>,

    /// Reply used when generation fails
    pub fallback_reply: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SolaceConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> SolaceConfigFile {
    let Some(path) = config_file_path() else {
        return SolaceConfigFile::default();
    };

    if !path.exists() {
        return SolaceConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                SolaceConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            SolaceConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/solace/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("solace").join("config.toml"))
}
