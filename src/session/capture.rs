//! Capture loop: audio device → bounded chunk queue.
//!
//! Runs in its own thread for the lifetime of one recording session. The
//! device is opened here, not by the controller, so an open failure is
//! reported as session events rather than crossing a thread boundary as an
//! error.

use crate::audio::{AudioFormat, AudioSourceFactory};
use crate::queue::ChunkSender;
use crate::session::controller::SharedSession;
use crate::session::events::EventSink;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) struct CaptureLoop {
    pub(crate) devices: Arc<dyn AudioSourceFactory>,
    pub(crate) format: AudioFormat,
    pub(crate) queue: ChunkSender,
    pub(crate) events: EventSink,
    pub(crate) shared: SharedSession,
}

impl CaptureLoop {
    /// Body of the capture thread.
    ///
    /// Cancellation is cooperative: the flag is checked at the top of each
    /// cycle and again immediately after the blocking read returns, so the
    /// worst-case stop latency is one frame period. The device is released
    /// on every exit path.
    pub(crate) fn run(self) {
        let mut source = match self.devices.open(&self.format) {
            Ok(source) => source,
            Err(e) => {
                self.shared.abort(&self.events, "failed to open audio device", &e);
                return;
            }
        };
        self.events.log("audio stream opened");

        let stop = &self.shared.stop_capture;
        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            match source.read_chunk() {
                Ok(chunk) => {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    if chunk.is_empty() {
                        continue;
                    }
                    if !self.queue.try_push(chunk) {
                        // Drop-newest backpressure: queued audio keeps its
                        // continuity, the freshest chunk is sacrificed.
                        self.events.log("audio queue full, chunk dropped");
                    }
                }
                Err(e) => {
                    if stop.load(Ordering::SeqCst) {
                        // Read errors during teardown are the normal exit
                        // path, not worth reporting.
                        break;
                    }
                    self.events.log(format!("audio read error: {e}"));
                }
            }
        }

        source.close();
        self.events.log("audio stream closed");
    }
}
