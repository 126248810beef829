//! Speech-to-text: recognizer abstraction, model handles, engine backends.

pub mod model;
pub mod recognizer;
#[cfg(feature = "vosk-engine")]
pub mod vosk;

pub use model::{ModelHandle, ModelStore};
pub use recognizer::{Recognizer, RecognizerFactory};
#[cfg(feature = "vosk-engine")]
pub use vosk::{VoskEngine, VoskRecognizer};
