//! Recognition loop: bounded chunk queue → recognizer → events.
//!
//! Runs in its own thread per session. Each cycle pops one chunk (with a
//! timeout so cancellation is observed within 100 ms), feeds the recognizer
//! and emits zero or more events. Cancellation is immediate: chunks still
//! queued at stop time are abandoned, trading completeness of the tail for
//! stop latency.

use crate::audio::AudioChunk;
use crate::queue::ChunkReceiver;
use crate::session::controller::SharedSession;
use crate::session::dedup::PartialDedup;
use crate::session::events::EventSink;
use crate::stt::recognizer::{Recognizer, RecognizerFactory};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// What one processed chunk produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// A completed utterance with non-empty text.
    Final(String),
    /// An in-progress hypothesis (possibly suppressed by the reducer).
    Partial(String),
    /// Boundary with no text, silence, or an undecodable engine payload.
    Empty,
}

#[derive(Deserialize)]
struct FinalPayload {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct PartialPayload {
    #[serde(default)]
    partial: String,
}

pub(crate) struct RecognitionLoop {
    pub(crate) engine: Arc<dyn RecognizerFactory>,
    pub(crate) sample_rate: u32,
    pub(crate) queue: ChunkReceiver,
    pub(crate) poll_timeout: Duration,
    pub(crate) dedup: PartialDedup,
    pub(crate) events: EventSink,
    pub(crate) shared: SharedSession,
}

impl RecognitionLoop {
    /// Body of the recognition thread.
    pub(crate) fn run(mut self) {
        let mut recognizer = match self.engine.create(self.sample_rate) {
            Ok(recognizer) => recognizer,
            Err(e) => {
                self.shared
                    .abort(&self.events, "failed to create recognizer", &e);
                return;
            }
        };
        self.events
            .log(format!("recognizer created at {} Hz", self.sample_rate));

        while !self.shared.stop_recognition.load(Ordering::SeqCst) {
            let Some(chunk) = self.queue.pop(self.poll_timeout) else {
                continue;
            };
            self.step(recognizer.as_mut(), &chunk);
        }
    }

    /// Process one chunk and emit the events it warrants.
    pub(crate) fn step(
        &mut self,
        recognizer: &mut dyn Recognizer,
        chunk: &AudioChunk,
    ) -> RecognitionOutcome {
        match recognizer.accept(chunk) {
            Ok(true) => self.utterance_complete(recognizer),
            Ok(false) => self.utterance_open(recognizer),
            Err(e) => {
                if !self.shared.stop_recognition.load(Ordering::SeqCst) {
                    self.events.log(format!("recognition error: {e}"));
                }
                RecognitionOutcome::Empty
            }
        }
    }

    fn utterance_complete(&mut self, recognizer: &mut dyn Recognizer) -> RecognitionOutcome {
        let text = match recognizer.result_json() {
            Ok(json) => match serde_json::from_str::<FinalPayload>(&json) {
                Ok(payload) => payload.text.trim().to_string(),
                Err(_) => {
                    self.events.log("malformed recognizer result, skipped");
                    return RecognitionOutcome::Empty;
                }
            },
            Err(e) => {
                self.events.log(format!("recognition error: {e}"));
                return RecognitionOutcome::Empty;
            }
        };

        if text.is_empty() {
            self.events.log("empty recognition result");
            return RecognitionOutcome::Empty;
        }

        self.events.log(format!("recognized: '{text}'"));
        self.events.transcript(text.clone());
        self.dedup.reset();
        RecognitionOutcome::Final(text)
    }

    fn utterance_open(&mut self, recognizer: &mut dyn Recognizer) -> RecognitionOutcome {
        let partial = match recognizer.partial_json() {
            Ok(json) => match serde_json::from_str::<PartialPayload>(&json) {
                Ok(payload) => payload.partial.trim().to_string(),
                Err(_) => {
                    self.events.log("malformed recognizer partial, skipped");
                    return RecognitionOutcome::Empty;
                }
            },
            Err(e) => {
                self.events.log(format!("recognition error: {e}"));
                return RecognitionOutcome::Empty;
            }
        };

        if partial.is_empty() {
            // Silence after a held hypothesis: forget it without an event.
            if self.dedup.has_pending() {
                self.dedup.reset();
            }
            return RecognitionOutcome::Empty;
        }

        if let Some(emission) = self.dedup.observe(&partial) {
            self.events
                .log(format!("partial: '{}' ({})", emission.text, emission.ordinal));
        }
        RecognitionOutcome::Partial(partial)
    }
}
