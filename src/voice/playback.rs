//! Speech playback adapter interface
//!
//! A playback adapter wraps the host's speech-synthesis capability. Speaking
//! is an awaited operation: the returned future resolves when the utterance
//! completes, errors, or is cancelled.

use async_trait::async_trait;

use crate::Result;

/// Utterance rendering options
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Speaking rate multiplier (0.9 is slightly slower, for a calm delivery)
    pub rate: f32,

    /// Pitch multiplier
    pub pitch: f32,

    /// Substring matched against available voice names (e.g. "female")
    pub voice_hint: Option<String>,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            voice_hint: None,
        }
    }
}

/// How a `speak` call resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The utterance played to the end
    Completed,
    /// The utterance was cancelled before completing
    Cancelled,
}

/// Speech synthesis adapter
#[async_trait]
pub trait SpeechPlayback: Send + Sync {
    /// Whether synthesis is supported in this environment
    fn available(&self) -> bool;

    /// Speak `text`, resolving on completion, error, or cancellation
    ///
    /// At most one utterance is active per adapter; callers cancel any prior
    /// utterance before starting a new one.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    async fn speak(&self, text: &str, options: &PlaybackOptions) -> Result<PlaybackOutcome>;

    /// Cancel the in-flight utterance, if any
    ///
    /// The pending `speak` call resolves immediately with
    /// [`PlaybackOutcome::Cancelled`]; no completion fires afterwards.
    fn cancel(&self);
}
