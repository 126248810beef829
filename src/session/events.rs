//! Typed event stream consumed by the host presentation layer.
//!
//! Both loops and the controller produce events into one ordered channel;
//! a single consumer (a GUI, a TUI, a test) drains it on its own schedule
//! with [`EventPoller::poll`]. The channel is unbounded so producers never
//! block — event volume is naturally rate-limited by the partial reducer.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Rendering hint for status-line updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusStyle {
    Neutral,
    Active,
    Success,
    Error,
}

/// Events emitted by a recording session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// One log line for the host's log pane.
    Log { message: String },
    /// Status-bar text change.
    StatusChanged { text: String, style: StatusStyle },
    /// A final transcription to append to the transcript pane.
    TranscriptAppended { text: String },
    /// Fatal-to-session error; hosts show a blocking notification.
    ErrorRaised { title: String, message: String },
    /// Informational notification.
    InfoRaised { title: String, message: String },
    /// Start/stop control availability.
    ButtonsUpdated {
        start_enabled: bool,
        stop_enabled: bool,
    },
}

impl Event {
    /// Serialize event to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Producer handle. Cloned into every loop thread; never reads.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<Event>,
}

impl EventSink {
    pub fn emit(&self, event: Event) {
        // The consumer owning the receiver may already be gone during
        // shutdown; a dead letter is not an error.
        let _ = self.tx.send(event);
    }

    pub fn log(&self, message: impl Into<String>) {
        self.emit(Event::Log {
            message: message.into(),
        });
    }

    pub fn status(&self, text: impl Into<String>, style: StatusStyle) {
        self.emit(Event::StatusChanged {
            text: text.into(),
            style,
        });
    }

    pub fn transcript(&self, text: impl Into<String>) {
        self.emit(Event::TranscriptAppended { text: text.into() });
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.emit(Event::ErrorRaised {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.emit(Event::InfoRaised {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn buttons(&self, start_enabled: bool, stop_enabled: bool) {
        self.emit(Event::ButtonsUpdated {
            start_enabled,
            stop_enabled,
        });
    }
}

/// Consumer handle. Single-consumer by construction: not `Clone`.
pub struct EventPoller {
    rx: Receiver<Event>,
}

impl EventPoller {
    /// Non-blocking drain of everything produced so far, in production order.
    pub fn poll(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Number of events waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Creates the event channel: many producers, one consumer.
pub fn event_channel() -> (EventSink, EventPoller) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, EventPoller { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_preserves_production_order() {
        let (sink, poller) = event_channel();
        sink.log("first");
        sink.log("second");
        sink.transcript("third");

        let events = poller.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            Event::Log {
                message: "first".to_string()
            }
        );
        assert_eq!(
            events[1],
            Event::Log {
                message: "second".to_string()
            }
        );
        assert_eq!(
            events[2],
            Event::TranscriptAppended {
                text: "third".to_string()
            }
        );
    }

    #[test]
    fn test_poll_on_empty_channel_returns_nothing() {
        let (_sink, poller) = event_channel();
        assert!(poller.poll().is_empty());
        assert_eq!(poller.pending(), 0);
    }

    #[test]
    fn test_multiple_producers_single_consumer() {
        let (sink, poller) = event_channel();
        let sink2 = sink.clone();

        let t1 = std::thread::spawn(move || {
            for _ in 0..50 {
                sink.log("a");
            }
        });
        let t2 = std::thread::spawn(move || {
            for _ in 0..50 {
                sink2.log("b");
            }
        });
        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(poller.poll().len(), 100);
    }

    #[test]
    fn test_emit_after_consumer_dropped_is_silent() {
        let (sink, poller) = event_channel();
        drop(poller);
        // Must not panic
        sink.log("into the void");
    }

    #[test]
    fn test_event_json_format_is_snake_case() {
        let event = Event::StatusChanged {
            text: "Recording".to_string(),
            style: StatusStyle::Active,
        };
        let json = event.to_json().expect("should serialize");
        assert!(
            json.contains("\"type\":\"status_changed\""),
            "JSON should use snake_case. Got: {}",
            json
        );
        assert!(json.contains("\"style\":\"active\""));
    }

    #[test]
    fn test_event_all_variants_json_roundtrip() {
        let events = vec![
            Event::Log {
                message: "hi".to_string(),
            },
            Event::StatusChanged {
                text: "Ready".to_string(),
                style: StatusStyle::Neutral,
            },
            Event::TranscriptAppended {
                text: "привет мир".to_string(),
            },
            Event::ErrorRaised {
                title: "Error".to_string(),
                message: "device open failed".to_string(),
            },
            Event::InfoRaised {
                title: "Info".to_string(),
                message: "model loaded".to_string(),
            },
            Event::ButtonsUpdated {
                start_enabled: true,
                stop_enabled: false,
            },
        ];

        for event in events {
            let json = event.to_json().expect("should serialize");
            let deserialized = Event::from_json(&json).expect("should deserialize");
            assert_eq!(event, deserialized, "roundtrip failed for {:?}", event);
        }
    }

    #[test]
    fn test_invalid_json_returns_error() {
        assert!(Event::from_json(r#"{"type":"unknown_event"}"#).is_err());
        assert!(Event::from_json("not json at all").is_err());
    }
}
