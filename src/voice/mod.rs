//! Voice processing module
//!
//! The session state machine plus the speech capture and playback adapter
//! interfaces it mediates between. Simulated adapters live in [`sim`].

mod capture;
mod playback;
mod session;
pub mod sim;

pub use capture::{
    CaptureConfig, CaptureErrorKind, CaptureEvent, DEFAULT_LANGUAGE, SpeechCapture,
};
pub use playback::{PlaybackOptions, PlaybackOutcome, SpeechPlayback};
pub use session::{Capabilities, ConversationMode, SessionState, VoiceSession};
