//! Vosk (Kaldi) streaming recognizer backend.
//!
//! Requires `libvosk` at link time; enabled with the `vosk-engine` feature.

use crate::audio::AudioChunk;
use crate::error::{GolosError, Result};
use crate::stt::model::ModelHandle;
use crate::stt::recognizer::{Recognizer, RecognizerFactory};
use vosk::{DecodingState, Model};

/// A loaded Vosk model that mints per-session recognizers.
///
/// The model itself is shared and immutable; each recognizer created from it
/// carries independent decoding state, so concurrent or back-to-back sessions
/// never observe each other.
pub struct VoskEngine {
    model: Model,
}

impl VoskEngine {
    /// Load the model behind `handle`.
    ///
    /// # Errors
    /// Returns `GolosError::ModelLoad` when libvosk rejects the path.
    pub fn new(handle: &ModelHandle) -> Result<Self> {
        let model = Model::new(handle.path().to_string_lossy()).ok_or_else(|| {
            GolosError::ModelLoad {
                path: handle.path().display().to_string(),
            }
        })?;
        Ok(Self { model })
    }
}

impl RecognizerFactory for VoskEngine {
    fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>> {
        let inner = vosk::Recognizer::new(&self.model, sample_rate as f32).ok_or_else(|| {
            GolosError::RecognizerCreate {
                message: format!("libvosk rejected sample rate {sample_rate}"),
            }
        })?;
        Ok(Box::new(VoskRecognizer { inner }))
    }
}

/// One session's streaming recognizer.
pub struct VoskRecognizer {
    inner: vosk::Recognizer,
}

impl Recognizer for VoskRecognizer {
    fn accept(&mut self, chunk: &AudioChunk) -> Result<bool> {
        match self.inner.accept_waveform(chunk.samples()) {
            Ok(DecodingState::Finalized) => Ok(true),
            Ok(DecodingState::Running) => Ok(false),
            Ok(DecodingState::Failed) => Err(GolosError::Recognition {
                message: "decoder reported failure for chunk".to_string(),
            }),
            Err(e) => Err(GolosError::Recognition {
                message: format!("accept_waveform: {e:?}"),
            }),
        }
    }

    fn result_json(&mut self) -> Result<String> {
        let text = self
            .inner
            .result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default();
        Ok(serde_json::json!({ "text": text }).to_string())
    }

    fn partial_json(&mut self) -> Result<String> {
        let partial = self.inner.partial_result().partial.to_string();
        Ok(serde_json::json!({ "partial": partial }).to_string())
    }
}
