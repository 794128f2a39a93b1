//! Voice session state machine
//!
//! Owns the conversation mode and the idle → listening → processing →
//! speaking cycle, mediating between the capture and playback adapters and
//! the chat transcript. Exactly one session exists per active chat view; the
//! view owns it and drops it on teardown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use super::capture::{CaptureErrorKind, CaptureEvent, SpeechCapture};
use super::playback::{PlaybackOptions, PlaybackOutcome, SpeechPlayback};
use crate::{Error, Result};

/// Conversation input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationMode {
    /// Typed input, silent replies
    Text,
    /// Spoken input, replies read aloud
    Voice,
}

/// State of the voice session
///
/// The cycle is idle → listening → processing → speaking → idle; there is no
/// terminal state. `Listening`, `Processing`, and `Speaking` only occur while
/// the mode is [`ConversationMode::Voice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for input
    Idle,
    /// Capturing speech, accumulating the transcript buffer
    Listening,
    /// Transcript captured, waiting for the owner to submit it
    Processing,
    /// Reading a reply aloud
    Speaking,
}

/// Speech capabilities probed once at session creation
///
/// Treated as immutable configuration for the session's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Speech recognition is supported
    pub recognition: bool,
    /// Speech synthesis is supported
    pub synthesis: bool,
}

struct Inner {
    mode: ConversationMode,
    state: SessionState,
    buffer: String,
    permission_granted: bool,
    last_error: Option<String>,
}

/// The voice session state machine
///
/// Methods take `&self`; the session is safe to share with child components
/// by reference. Adapter errors are captured into `last_error` and force the
/// state back to `Idle`; they never end the session.
pub struct VoiceSession {
    inner: Arc<Mutex<Inner>>,
    capture: Arc<dyn SpeechCapture>,
    playback: Arc<dyn SpeechPlayback>,
    capabilities: Capabilities,
    options: PlaybackOptions,
    pump: Option<JoinHandle<()>>,
}

impl VoiceSession {
    /// Create a session over the given adapters
    ///
    /// Probes capabilities and microphone permission once, and subscribes to
    /// the capture event stream. Must be called within a tokio runtime.
    #[must_use]
    pub fn new(
        capture: Arc<dyn SpeechCapture>,
        playback: Arc<dyn SpeechPlayback>,
        options: PlaybackOptions,
    ) -> Self {
        let capabilities = Capabilities {
            recognition: capture.available(),
            synthesis: playback.available(),
        };
        let permission_granted = capabilities.recognition && capture.permission_granted();

        let last_error = if capabilities.recognition {
            None
        } else {
            Some("speech recognition is not supported in this environment".to_string())
        };

        let inner = Arc::new(Mutex::new(Inner {
            mode: ConversationMode::Text,
            state: SessionState::Idle,
            buffer: String::new(),
            permission_granted,
            last_error,
        }));

        // Single subscription for the session's lifetime; the pump ends when
        // the adapter drops its sender.
        let pump = capture.events().map(|mut rx| {
            let inner = Arc::clone(&inner);
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    Self::apply_capture_event(&inner, event);
                }
            })
        });

        tracing::debug!(
            recognition = capabilities.recognition,
            synthesis = capabilities.synthesis,
            permission_granted,
            "voice session created"
        );

        Self {
            inner,
            capture,
            playback,
            capabilities,
            options,
            pump,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin capturing speech
    ///
    /// Clears the transcript buffer and moves `Idle` → `Listening`. A no-op
    /// outside `Idle`.
    ///
    /// # Errors
    ///
    /// Returns error (and records it in `last_error`) if voice mode is not
    /// active, recognition is unavailable, microphone permission was denied,
    /// or the adapter fails to start. The state stays `Idle` and the buffer
    /// is left untouched.
    pub fn start_listening(&self) -> Result<()> {
        {
            let mut s = self.lock();
            if s.mode == ConversationMode::Text {
                return Err(Error::Session("voice mode is not active".to_string()));
            }
            if !self.capabilities.recognition {
                let err = Error::AdapterUnavailable(
                    "speech recognition is not supported".to_string(),
                );
                s.last_error = Some(err.to_string());
                return Err(err);
            }
            if !s.permission_granted {
                let err = Error::Permission(
                    "enable microphone access to use voice input".to_string(),
                );
                s.last_error = Some(err.to_string());
                return Err(err);
            }
            if s.state != SessionState::Idle {
                tracing::debug!(state = ?s.state, "start_listening ignored");
                return Ok(());
            }
            s.buffer.clear();
        }

        match self.capture.start() {
            Ok(()) => {
                let mut s = self.lock();
                s.state = SessionState::Listening;
                s.last_error = None;
                tracing::debug!("listening");
                Ok(())
            }
            Err(e) => {
                let mut s = self.lock();
                s.last_error = Some(e.to_string());
                s.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Stop capturing and hand the transcript off
    ///
    /// Moves `Listening` → `Processing`; the owner then takes the buffer with
    /// [`Self::take_transcript`]. A no-op outside `Listening`.
    ///
    /// # Errors
    ///
    /// Returns error if the adapter fails to stop; the state returns to
    /// `Idle` and `last_error` is set.
    pub fn stop_listening(&self) -> Result<()> {
        {
            let s = self.lock();
            if s.state != SessionState::Listening {
                return Ok(());
            }
        }

        match self.capture.stop() {
            Ok(()) => {
                let mut s = self.lock();
                if s.state == SessionState::Listening {
                    s.state = SessionState::Processing;
                }
                tracing::debug!(transcript_len = s.buffer.len(), "transcript ready");
                Ok(())
            }
            Err(e) => {
                let mut s = self.lock();
                s.last_error = Some(e.to_string());
                s.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Speak `text`, cancelling any prior utterance first
    ///
    /// Moves to `Speaking` and suspends the caller until playback completes,
    /// errors, or is cancelled; cancellation resolves this call immediately.
    ///
    /// # Errors
    ///
    /// Returns error if voice mode is not active, synthesis is unavailable,
    /// or the adapter fails; failures are recorded in `last_error` and the
    /// state returns to `Idle`.
    pub async fn speak_text(&self, text: &str) -> Result<PlaybackOutcome> {
        {
            let mut s = self.lock();
            if s.mode == ConversationMode::Text {
                return Err(Error::Session("voice mode is not active".to_string()));
            }
            if !self.capabilities.synthesis {
                let err = Error::AdapterUnavailable(
                    "speech synthesis is not supported".to_string(),
                );
                s.last_error = Some(err.to_string());
                return Err(err);
            }
        }

        // At most one active utterance: always cancel-then-start
        self.playback.cancel();
        {
            let mut s = self.lock();
            s.state = SessionState::Speaking;
        }

        match self.playback.speak(text, &self.options).await {
            Ok(PlaybackOutcome::Completed) => {
                let mut s = self.lock();
                if s.state == SessionState::Speaking {
                    s.state = SessionState::Idle;
                }
                s.last_error = None;
                Ok(PlaybackOutcome::Completed)
            }
            // Whoever cancelled (stop_speaking, a newer utterance, or a mode
            // toggle) has already set the state
            Ok(PlaybackOutcome::Cancelled) => Ok(PlaybackOutcome::Cancelled),
            Err(e) => {
                let mut s = self.lock();
                s.last_error = Some(e.to_string());
                if s.state == SessionState::Speaking {
                    s.state = SessionState::Idle;
                }
                Err(e)
            }
        }
    }

    /// Cancel the in-flight utterance and return to `Idle`
    pub fn stop_speaking(&self) {
        self.playback.cancel();
        let mut s = self.lock();
        if s.state == SessionState::Speaking {
            s.state = SessionState::Idle;
        }
    }

    /// Flip between text and voice mode
    ///
    /// Cancels any in-flight listening or speaking, clears the transcript
    /// buffer, and resets to `Idle`. Returns the new mode.
    pub fn toggle_voice_mode(&self) -> ConversationMode {
        if let Err(e) = self.capture.stop() {
            tracing::debug!(error = %e, "capture stop during mode toggle failed");
        }
        self.playback.cancel();

        let mut s = self.lock();
        s.state = SessionState::Idle;
        s.buffer.clear();
        s.mode = match s.mode {
            ConversationMode::Text => ConversationMode::Voice,
            ConversationMode::Voice => ConversationMode::Text,
        };
        tracing::debug!(mode = ?s.mode, "conversation mode toggled");
        s.mode
    }

    /// Take the buffered transcript, clearing it
    #[must_use]
    pub fn take_transcript(&self) -> String {
        std::mem::take(&mut self.lock().buffer)
    }

    /// Return the session to `Idle` after a `Processing` hand-off
    ///
    /// Used when the reply will not be spoken; speaking returns to `Idle` on
    /// its own.
    pub fn finish_processing(&self) {
        let mut s = self.lock();
        if s.state == SessionState::Processing {
            s.state = SessionState::Idle;
        }
    }

    /// Apply an adapter lifecycle event
    ///
    /// Called by the internal event pump; exposed for owners that drive the
    /// adapter event stream themselves.
    pub fn handle_capture_event(&self, event: CaptureEvent) {
        Self::apply_capture_event(&self.inner, event);
    }

    fn apply_capture_event(inner: &Mutex<Inner>, event: CaptureEvent) {
        let mut s = inner.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            CaptureEvent::Started => {
                tracing::trace!("capture adapter started");
            }
            CaptureEvent::Interim(text) => {
                if s.state == SessionState::Listening {
                    s.buffer = text;
                }
            }
            CaptureEvent::Ended => {
                // Adapter-initiated end of speech hands the transcript off,
                // same as a user-initiated stop
                if s.state == SessionState::Listening {
                    s.state = SessionState::Processing;
                    tracing::debug!("capture ended, transcript ready");
                }
            }
            CaptureEvent::Error(kind) => {
                tracing::warn!(?kind, "capture error");
                s.last_error = Some(kind.message().to_string());
                if kind == CaptureErrorKind::PermissionDenied {
                    s.permission_granted = false;
                }
                s.state = SessionState::Idle;
            }
        }
    }

    /// Current conversation mode
    #[must_use]
    pub fn mode(&self) -> ConversationMode {
        self.lock().mode
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Current transcript buffer contents
    #[must_use]
    pub fn transcript(&self) -> String {
        self.lock().buffer.clone()
    }

    /// Whether microphone permission is granted
    #[must_use]
    pub fn permission_granted(&self) -> bool {
        self.lock().permission_granted
    }

    /// The most recent adapter error, if any
    ///
    /// Cleared on the next successful listen or speak.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Capabilities probed at creation
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl Drop for VoiceSession {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
