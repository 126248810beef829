use crate::defaults;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One fixed-size block of 16-bit PCM samples produced by a single capture read.
///
/// Chunks are immutable after creation and implicitly ordered by arrival;
/// the pipeline preserves that order end-to-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    samples: Vec<i16>,
}

impl AudioChunk {
    /// Creates a chunk from captured samples.
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// Creates an empty chunk (a read that yielded no samples).
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Capture format requested when opening an audio source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per read.
    pub frame_size: usize,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            frame_size: defaults::FRAME_SIZE,
        }
    }
}

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Read one chunk from the source, blocking until a full frame is
    /// available.
    ///
    /// Device overflow must not surface as an error: the best-effort chunk
    /// is returned and capture continues. A short or empty chunk is a valid
    /// result.
    fn read_chunk(&mut self) -> Result<AudioChunk>;

    /// Release the device. Idempotent and infallible from the caller's
    /// perspective; internal errors are swallowed and logged so cleanup
    /// always completes.
    fn close(&mut self);
}

/// Opens a fresh audio source per recording session.
///
/// Each session owns newly constructed device resources; a factory is how
/// the session controller gets them without holding any device state itself.
pub trait AudioSourceFactory: Send + Sync {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn AudioSource>>;
}

/// One scripted read for [`MockAudioSource`].
#[derive(Debug, Clone)]
pub enum ScriptedRead {
    /// A successful read yielding these samples.
    Chunk(Vec<i16>),
    /// A transient read failure with this message.
    Failure(String),
}

/// Mock audio source for testing.
///
/// Plays back a scripted sequence of reads, then returns empty chunks after
/// a short idle wait (mimicking a quiet live microphone without busy-spinning).
pub struct MockAudioSource {
    reads: VecDeque<ScriptedRead>,
    idle_wait: Duration,
    read_count: Arc<AtomicU32>,
    closed: Arc<AtomicBool>,
    close_count: Arc<AtomicU32>,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            idle_wait: Duration::from_millis(1),
            read_count: Arc::new(AtomicU32::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
            close_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Configure the mock to yield these chunks, in order.
    pub fn with_chunks(mut self, chunks: Vec<Vec<i16>>) -> Self {
        self.reads.extend(chunks.into_iter().map(ScriptedRead::Chunk));
        self
    }

    /// Append a single scripted read failure.
    pub fn with_read_failure(mut self, message: &str) -> Self {
        self.reads
            .push_back(ScriptedRead::Failure(message.to_string()));
        self
    }

    /// Configure the wait before an empty read once the script is exhausted.
    pub fn with_idle_wait(mut self, wait: Duration) -> Self {
        self.idle_wait = wait;
        self
    }

    /// Shared counter of reads performed.
    pub fn read_count(&self) -> Arc<AtomicU32> {
        self.read_count.clone()
    }

    /// Shared flag set once `close` has been called.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn read_chunk(&mut self) -> Result<AudioChunk> {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        match self.reads.pop_front() {
            Some(ScriptedRead::Chunk(samples)) => Ok(AudioChunk::new(samples)),
            Some(ScriptedRead::Failure(message)) => {
                Err(crate::error::GolosError::AudioRead { message })
            }
            None => {
                std::thread::sleep(self.idle_wait);
                Ok(AudioChunk::empty())
            }
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory that opens [`MockAudioSource`]s from a shared script.
///
/// Counts opens and closes so tests can assert that every session constructs
/// and releases its own device.
pub struct MockDeviceFactory {
    script: Vec<ScriptedRead>,
    fail_open: Option<String>,
    idle_wait: Duration,
    opens: Arc<AtomicU32>,
    closes: Arc<AtomicU32>,
}

impl MockDeviceFactory {
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            fail_open: None,
            idle_wait: Duration::from_millis(1),
            opens: Arc::new(AtomicU32::new(0)),
            closes: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Every opened source will play back these chunks.
    pub fn with_chunks(mut self, chunks: Vec<Vec<i16>>) -> Self {
        self.script
            .extend(chunks.into_iter().map(ScriptedRead::Chunk));
        self
    }

    /// Append a scripted read failure to the playback.
    pub fn with_read_failure(mut self, message: &str) -> Self {
        self.script.push(ScriptedRead::Failure(message.to_string()));
        self
    }

    /// Make `open` fail with this message (device-open fatal path).
    pub fn with_open_failure(mut self, message: &str) -> Self {
        self.fail_open = Some(message.to_string());
        self
    }

    pub fn with_idle_wait(mut self, wait: Duration) -> Self {
        self.idle_wait = wait;
        self
    }

    pub fn open_count(&self) -> Arc<AtomicU32> {
        self.opens.clone()
    }

    pub fn close_count(&self) -> Arc<AtomicU32> {
        self.closes.clone()
    }
}

impl Default for MockDeviceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSourceFactory for MockDeviceFactory {
    fn open(&self, _format: &AudioFormat) -> Result<Box<dyn AudioSource>> {
        if let Some(message) = &self.fail_open {
            return Err(crate::error::GolosError::AudioCapture {
                message: message.clone(),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        let mut source = MockAudioSource::new().with_idle_wait(self.idle_wait);
        source.reads = self.script.iter().cloned().collect();
        source.close_count = self.closes.clone();
        Ok(Box::new(source))
    }
}
