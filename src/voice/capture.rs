//! Speech capture adapter interface
//!
//! A capture adapter wraps whatever continuous speech-recognition capability
//! the host provides. It emits typed lifecycle events over a channel that the
//! session subscribes to exactly once at construction.

use tokio::sync::mpsc;

use crate::Result;

/// Default recognition language tag
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Configuration handed to a capture adapter
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// BCP-47 language tag (e.g. "en-US")
    pub language: String,

    /// Keep recognizing across pauses until explicitly stopped
    pub continuous: bool,

    /// Emit partial transcripts while the user is still speaking
    pub interim_results: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// Lifecycle events emitted by a capture adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Recognition started
    Started,
    /// Partial transcript update (latest recognized text, not a delta)
    Interim(String),
    /// The adapter ended recognition on its own (e.g. end of speech)
    Ended,
    /// Recognition failed
    Error(CaptureErrorKind),
}

/// Capture failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// Microphone access was denied
    PermissionDenied,
    /// Transient recognition failure (no speech, audio glitch, service error)
    Recognition,
    /// Recognition was aborted by the host
    Aborted,
}

impl CaptureErrorKind {
    /// Human-readable description used for session error display
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "microphone permission denied, please enable microphone access"
            }
            Self::Recognition => "speech recognition failed",
            Self::Aborted => "speech recognition was aborted",
        }
    }
}

/// Continuous speech recognition adapter
///
/// Implementations are event-driven: `start` and `stop` are synchronous
/// triggers, results arrive on the channel returned by [`SpeechCapture::events`].
pub trait SpeechCapture: Send + Sync {
    /// Whether recognition is supported in this environment
    ///
    /// Probed once at session creation and treated as immutable afterwards.
    fn available(&self) -> bool;

    /// Whether microphone permission has been granted
    fn permission_granted(&self) -> bool;

    /// Begin capturing audio
    ///
    /// # Errors
    ///
    /// Returns error if recognition cannot be started
    fn start(&self) -> Result<()>;

    /// Stop capturing audio
    ///
    /// # Errors
    ///
    /// Returns error if the underlying recognizer fails to stop
    fn stop(&self) -> Result<()>;

    /// Take the adapter's event stream
    ///
    /// Yields `Some` exactly once; the session subscribes at construction and
    /// the subscription ends when the adapter is dropped.
    fn events(&self) -> Option<mpsc::UnboundedReceiver<CaptureEvent>>;
}
