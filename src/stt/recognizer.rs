use crate::audio::AudioChunk;
use crate::error::{GolosError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Trait for streaming speech recognizers.
///
/// One recognizer serves one recording session: it consumes PCM chunks in
/// arrival order and reports utterance boundaries. Results come back as the
/// engine's raw JSON (`{"text": ...}` / `{"partial": ...}`); the recognition
/// loop owns decoding, so a malformed payload degrades to an empty outcome
/// instead of killing the session.
pub trait Recognizer: Send {
    /// Feed one chunk. Returns `true` when an utterance just completed.
    fn accept(&mut self, chunk: &AudioChunk) -> Result<bool>;

    /// Final result for the completed utterance, as `{"text": ...}` JSON.
    fn result_json(&mut self) -> Result<String>;

    /// In-progress hypothesis, as `{"partial": ...}` JSON.
    fn partial_json(&mut self) -> Result<String>;
}

/// Mints a fresh recognizer per recording session.
///
/// The engine behind the factory already owns a loaded model; `create` only
/// binds it to a sample rate. Sessions never share recognizer state.
pub trait RecognizerFactory: Send + Sync {
    fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>>;
}

/// One scripted recognizer response for [`MockRecognizer`].
///
/// Each step answers one `accept` call and the result/partial fetch that
/// follows it.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Utterance still open; `partial_json` yields this hypothesis.
    Partial(String),
    /// Utterance complete; `result_json` yields this text.
    Final(String),
    /// Utterance complete with no recognized text.
    EmptyFinal,
    /// Utterance complete but `result_json` returns unparseable output.
    MalformedFinal,
    /// Utterance open but `partial_json` returns unparseable output.
    MalformedPartial,
    /// `accept` itself fails with this message.
    AcceptError(String),
}

/// Mock recognizer for testing: plays back a script, one step per chunk.
///
/// Once the script is exhausted every chunk looks like silence (utterance
/// open, empty partial).
pub struct MockRecognizer {
    steps: VecDeque<ScriptedStep>,
    current: Option<ScriptedStep>,
}

impl MockRecognizer {
    pub fn new(steps: Vec<ScriptedStep>) -> Self {
        Self {
            steps: steps.into(),
            current: None,
        }
    }
}

impl Recognizer for MockRecognizer {
    fn accept(&mut self, _chunk: &AudioChunk) -> Result<bool> {
        self.current = self.steps.pop_front();
        match &self.current {
            Some(ScriptedStep::Final(_))
            | Some(ScriptedStep::EmptyFinal)
            | Some(ScriptedStep::MalformedFinal) => Ok(true),
            Some(ScriptedStep::AcceptError(message)) => Err(GolosError::Recognition {
                message: message.clone(),
            }),
            Some(ScriptedStep::Partial(_)) | Some(ScriptedStep::MalformedPartial) | None => {
                Ok(false)
            }
        }
    }

    fn result_json(&mut self) -> Result<String> {
        match &self.current {
            Some(ScriptedStep::Final(text)) => {
                Ok(serde_json::json!({ "text": text }).to_string())
            }
            Some(ScriptedStep::MalformedFinal) => Ok("{not valid json".to_string()),
            _ => Ok(serde_json::json!({ "text": "" }).to_string()),
        }
    }

    fn partial_json(&mut self) -> Result<String> {
        match &self.current {
            Some(ScriptedStep::Partial(text)) => {
                Ok(serde_json::json!({ "partial": text }).to_string())
            }
            Some(ScriptedStep::MalformedPartial) => Ok("]]".to_string()),
            _ => Ok(serde_json::json!({ "partial": "" }).to_string()),
        }
    }
}

/// Factory producing [`MockRecognizer`]s from a shared script.
///
/// Counts creations so tests can assert a fresh recognizer per session.
pub struct MockEngine {
    script: Vec<ScriptedStep>,
    fail_create: Option<String>,
    creations: Arc<AtomicU32>,
}

impl MockEngine {
    pub fn new(script: Vec<ScriptedStep>) -> Self {
        Self {
            script,
            fail_create: None,
            creations: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Make `create` fail (recognizer-creation fatal path).
    pub fn with_create_failure(mut self, message: &str) -> Self {
        self.fail_create = Some(message.to_string());
        self
    }

    pub fn create_count(&self) -> Arc<AtomicU32> {
        self.creations.clone()
    }
}

impl RecognizerFactory for MockEngine {
    fn create(&self, _sample_rate: u32) -> Result<Box<dyn Recognizer>> {
        if let Some(message) = &self.fail_create {
            return Err(GolosError::RecognizerCreate {
                message: message.clone(),
            });
        }
        self.creations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockRecognizer::new(self.script.clone())))
    }
}
