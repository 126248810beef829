//! Recording session: lifecycle control, capture/recognition loops, events.

pub mod capture;
pub mod controller;
pub mod dedup;
pub mod events;
pub mod recognition;

pub use controller::{SessionConfig, SessionController, SessionState};
pub use dedup::{PartialDedup, PartialEmission};
pub use events::{event_channel, Event, EventPoller, EventSink, StatusStyle};
pub use recognition::RecognitionOutcome;
