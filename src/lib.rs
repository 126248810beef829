//! golos - Offline speech recognition sessions over Vosk
//!
//! Captures microphone audio and streams it through a speech recognizer,
//! emitting transcript and status events as the user speaks.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod queue;
pub mod session;
pub mod stt;

// Core traits (capture → recognize → emit)
pub use audio::{AudioChunk, AudioFormat, AudioSource, AudioSourceFactory};
pub use stt::{Recognizer, RecognizerFactory};

// Session lifecycle and its event stream
pub use session::{
    Event, EventPoller, EventSink, SessionConfig, SessionController, SessionState, StatusStyle,
};

// Error handling
pub use error::{GolosError, Result};

// Config
pub use config::Config;

// Models
pub use stt::{ModelHandle, ModelStore};
