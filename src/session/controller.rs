//! Session lifecycle: start/stop state and the two loop threads.

use crate::audio::{AudioFormat, AudioSourceFactory};
use crate::defaults;
use crate::error::{GolosError, Result};
use crate::queue::chunk_queue;
use crate::session::capture::CaptureLoop;
use crate::session::dedup::PartialDedup;
use crate::session::events::{event_channel, EventPoller, EventSink, StatusStyle};
use crate::session::recognition::RecognitionLoop;
use crate::stt::model::ModelStore;
use crate::stt::recognizer::RecognizerFactory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

/// Flags shared between the controller and one session's loop threads.
///
/// The stop flags belong to exactly one session; a new `start` allocates
/// fresh ones, so loops from a previous session can never be re-armed or
/// observed by mistake.
#[derive(Clone)]
pub(crate) struct SharedSession {
    pub(crate) recording: Arc<AtomicBool>,
    pub(crate) stop_capture: Arc<AtomicBool>,
    pub(crate) stop_recognition: Arc<AtomicBool>,
}

impl SharedSession {
    /// Fatal-to-session abort, called from inside a loop thread.
    ///
    /// Cancels both loops, returns the controller to Idle and surfaces the
    /// failure as events. When the session was already cancelled (its stop
    /// flags set) the failure belongs to a session being torn down and is
    /// not reported.
    pub(crate) fn abort(&self, events: &EventSink, what: &str, error: &GolosError) {
        let already_cancelled = self.stop_capture.load(Ordering::SeqCst)
            && self.stop_recognition.load(Ordering::SeqCst);
        self.stop_capture.store(true, Ordering::SeqCst);
        self.stop_recognition.store(true, Ordering::SeqCst);
        if already_cancelled {
            return;
        }
        self.recording.store(false, Ordering::SeqCst);
        events.log(format!("{what}: {error}"));
        events.error("Recording error", format!("{what}: {error}"));
        events.status("Recording failed", StatusStyle::Error);
        events.buttons(true, false);
    }
}

/// Tunable parameters for a recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub format: AudioFormat,
    pub queue_capacity: usize,
    pub poll_timeout: Duration,
    pub partial_repeat_cap: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            queue_capacity: defaults::QUEUE_CAPACITY,
            poll_timeout: defaults::POLL_TIMEOUT,
            partial_repeat_cap: defaults::PARTIAL_REPEAT_CAP,
        }
    }
}

/// Owns start/stop state and coordinates the capture and recognition loops.
///
/// Every successful `start` constructs a fresh device, recognizer, queue and
/// cancellation flags; nothing is reused across sessions. `stop` is
/// synchronous from the caller's point of view while the loops wind down on
/// their own threads.
pub struct SessionController {
    config: SessionConfig,
    devices: Arc<dyn AudioSourceFactory>,
    engine: Arc<dyn RecognizerFactory>,
    events: EventSink,
    recording: Arc<AtomicBool>,
    stop_capture: Arc<AtomicBool>,
    stop_recognition: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl SessionController {
    /// Creates a controller and the event stream its host should drain.
    pub fn new(
        devices: Arc<dyn AudioSourceFactory>,
        engine: Arc<dyn RecognizerFactory>,
        config: SessionConfig,
    ) -> (Self, EventPoller) {
        let (events, poller) = event_channel();
        let controller = Self {
            config,
            devices,
            engine,
            events,
            recording: Arc::new(AtomicBool::new(false)),
            // Set so a stray abort from a never-started session stays silent
            stop_capture: Arc::new(AtomicBool::new(true)),
            stop_recognition: Arc::new(AtomicBool::new(true)),
            threads: Vec::new(),
        };
        (controller, poller)
    }

    pub fn state(&self) -> SessionState {
        if self.recording.load(Ordering::SeqCst) {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state() == SessionState::Recording
    }

    /// Starts a recording session.
    ///
    /// # Errors
    /// `ModelNotLoaded` when the store holds no model (an error event is
    /// raised as well); `AlreadyRecording` when a session is active — the
    /// running session is left untouched and a soft warning is logged.
    pub fn start(&mut self, models: &ModelStore) -> Result<()> {
        if models.loaded_model().is_none() {
            self.events
                .error("Error", "No model is loaded. Select a model first.");
            return Err(GolosError::ModelNotLoaded);
        }
        if self.recording.swap(true, Ordering::SeqCst) {
            self.events.log("start ignored: already recording");
            return Err(GolosError::AlreadyRecording);
        }

        // Fresh cancellation signals for this session only.
        self.stop_capture = Arc::new(AtomicBool::new(false));
        self.stop_recognition = Arc::new(AtomicBool::new(false));
        let shared = SharedSession {
            recording: self.recording.clone(),
            stop_capture: self.stop_capture.clone(),
            stop_recognition: self.stop_recognition.clone(),
        };

        self.events
            .status("Recording… speak now", StatusStyle::Active);
        self.events.log("=== recording started ===");
        self.events.buttons(false, true);

        let (chunk_tx, chunk_rx) = chunk_queue(self.config.queue_capacity);

        // Threads of a previous session wind down on their own; detach them.
        self.threads.clear();

        let capture = CaptureLoop {
            devices: self.devices.clone(),
            format: self.config.format.clone(),
            queue: chunk_tx,
            events: self.events.clone(),
            shared: shared.clone(),
        };
        self.threads.push(thread::spawn(move || capture.run()));

        let recognition = RecognitionLoop {
            engine: self.engine.clone(),
            sample_rate: self.config.format.sample_rate,
            queue: chunk_rx,
            poll_timeout: self.config.poll_timeout,
            dedup: PartialDedup::new(self.config.partial_repeat_cap),
            events: self.events.clone(),
            shared,
        };
        self.threads.push(thread::spawn(move || recognition.run()));

        Ok(())
    }

    /// Stops the active session. A no-op when already Idle.
    ///
    /// Sets both cancellation signals and transitions to Idle immediately;
    /// does not wait for the loops to finish.
    pub fn stop(&mut self) {
        if !self.recording.swap(false, Ordering::SeqCst) {
            return;
        }
        self.stop_capture.store(true, Ordering::SeqCst);
        self.stop_recognition.store(true, Ordering::SeqCst);

        self.events.status("Recording stopped", StatusStyle::Neutral);
        self.events.log("=== recording stopped ===");
        self.events.buttons(true, false);
    }

    /// Stops the session and joins the loop threads with a deadline.
    ///
    /// After the deadline, remaining threads are detached — they die with
    /// the process. Intended for host shutdown, not for the regular
    /// start/stop cycle.
    pub fn shutdown(&mut self) {
        self.stop();

        let deadline = Instant::now() + Duration::from_secs(1);
        let poll_interval = Duration::from_millis(50);

        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("golos: session thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                eprintln!(
                    "golos: shutdown timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                self.threads.clear();
                break;
            }
            thread::sleep(poll_interval);
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}
