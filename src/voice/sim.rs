//! Simulated speech adapters
//!
//! Stand in for a host speech stack in tests and the CLI chat loop: a
//! scripted capture that replays interim transcripts, and a playback that
//! "speaks" for a duration proportional to the text length and supports
//! cooperative cancellation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use super::capture::{CaptureConfig, CaptureErrorKind, CaptureEvent, SpeechCapture};
use super::playback::{PlaybackOptions, PlaybackOutcome, SpeechPlayback};
use crate::{Error, Result};

/// Scripted capture adapter
///
/// On `start`, emits `Started` followed by one `Interim` event per scripted
/// transcript. Adapter-initiated events (`Ended`, `Error`) can be injected
/// with [`SimCapture::emit`].
pub struct SimCapture {
    sender: mpsc::UnboundedSender<CaptureEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<CaptureEvent>>>,
    script: Mutex<Vec<String>>,
    config: CaptureConfig,
    available: bool,
    permission: bool,
    fail_start: bool,
    fail_stop: bool,
}

impl SimCapture {
    /// Create a capture adapter that replays the given interim transcripts
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            script: Mutex::new(script.into_iter().map(Into::into).collect()),
            config: CaptureConfig::default(),
            available: true,
            permission: true,
            fail_start: false,
            fail_stop: false,
        }
    }

    /// Override the capture configuration
    #[must_use]
    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Adapter reporting no recognition support
    #[must_use]
    pub fn unavailable() -> Self {
        let mut capture = Self::new(Vec::<String>::new());
        capture.available = false;
        capture
    }

    /// Adapter reporting denied microphone permission
    #[must_use]
    pub fn without_permission() -> Self {
        let mut capture = Self::new(Vec::<String>::new());
        capture.permission = false;
        capture
    }

    /// Make `start` fail with a recognition error
    #[must_use]
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Make `stop` fail with a recognition error
    #[must_use]
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Replace the scripted interim transcripts for the next `start`
    pub fn set_script<I, S>(&self, script: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut s) = self.script.lock() {
            *s = script.into_iter().map(Into::into).collect();
        }
    }

    /// Inject an adapter-initiated event (e.g. `Ended` or `Error`)
    pub fn emit(&self, event: CaptureEvent) {
        let _ = self.sender.send(event);
    }
}

impl SpeechCapture for SimCapture {
    fn available(&self) -> bool {
        self.available
    }

    fn permission_granted(&self) -> bool {
        self.permission
    }

    fn start(&self) -> Result<()> {
        if self.fail_start {
            return Err(Error::Recognition(
                "simulated recognizer refused to start".to_string(),
            ));
        }

        let _ = self.sender.send(CaptureEvent::Started);

        let script = self
            .script
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default();
        for interim in script {
            let _ = self.sender.send(CaptureEvent::Interim(interim));
        }

        tracing::debug!(
            language = %self.config.language,
            continuous = self.config.continuous,
            "simulated capture started"
        );
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        if self.fail_stop {
            return Err(Error::Recognition(
                "simulated recognizer failed to stop".to_string(),
            ));
        }
        tracing::debug!("simulated capture stopped");
        Ok(())
    }

    fn events(&self) -> Option<mpsc::UnboundedReceiver<CaptureEvent>> {
        self.receiver.lock().ok().and_then(|mut r| r.take())
    }
}

/// Simulated playback adapter
///
/// Each utterance takes `char_delay` per character; `cancel` resolves the
/// in-flight `speak` immediately. Completed utterances are recorded and can
/// be inspected with [`SimPlayback::spoken`].
pub struct SimPlayback {
    cancel: Notify,
    spoken: Mutex<Vec<String>>,
    char_delay: Duration,
    available: bool,
    fail: bool,
}

impl SimPlayback {
    /// Create a playback adapter with a 1ms-per-character utterance duration
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancel: Notify::new(),
            spoken: Mutex::new(Vec::new()),
            char_delay: Duration::from_millis(1),
            available: true,
            fail: false,
        }
    }

    /// Override the per-character utterance duration
    #[must_use]
    pub const fn with_char_delay(mut self, delay: Duration) -> Self {
        self.char_delay = delay;
        self
    }

    /// Adapter reporting no synthesis support
    #[must_use]
    pub fn unavailable() -> Self {
        let mut playback = Self::new();
        playback.available = false;
        playback
    }

    /// Make every `speak` fail with a synthesis error
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Texts that played to completion, in order
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for SimPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechPlayback for SimPlayback {
    fn available(&self) -> bool {
        self.available
    }

    async fn speak(&self, text: &str, options: &PlaybackOptions) -> Result<PlaybackOutcome> {
        if self.fail {
            return Err(Error::Synthesis(
                "simulated synthesizer failed".to_string(),
            ));
        }

        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        let duration = self.char_delay.saturating_mul(chars);

        tracing::debug!(
            chars,
            rate = options.rate,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "simulated playback started"
        );

        tokio::select! {
            () = tokio::time::sleep(duration) => {
                if let Ok(mut spoken) = self.spoken.lock() {
                    spoken.push(text.to_string());
                }
                tracing::debug!("simulated playback complete");
                Ok(PlaybackOutcome::Completed)
            }
            () = self.cancel.notified() => {
                tracing::debug!("simulated playback cancelled");
                Ok(PlaybackOutcome::Cancelled)
            }
        }
    }

    fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}
