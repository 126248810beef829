//! Microphone capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::{AudioChunk, AudioFormat, AudioSource, AudioSourceFactory};
use crate::error::{GolosError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Longest a single `read_chunk` call blocks before yielding an empty chunk.
/// Keeps the capture loop responsive to its stop signal while the device
/// is silent.
const READ_WAIT: Duration = Duration::from_millis(100);

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Device names that route through the desktop sound server and therefore
/// respect the user's input-device selection.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List the names of all available audio input devices.
///
/// # Errors
/// Returns `GolosError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| {
        cpal::default_host()
            .input_devices()
            .map(|iter| iter.collect::<Vec<_>>())
    })
    .map_err(|e| GolosError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    Ok(devices
        .into_iter()
        .filter_map(|device| device.name().ok())
        .collect())
}

/// Pick an input device, preferring PipeWire/PulseAudio when no name is given.
fn find_device(device_name: Option<&str>) -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Some(name) = device_name {
            let devices = host.input_devices().map_err(|e| GolosError::AudioCapture {
                message: format!("Failed to enumerate devices: {}", e),
            })?;
            for device in devices {
                if device.name().map(|n| n == name).unwrap_or(false) {
                    return Ok(device);
                }
            }
            return Err(GolosError::AudioDeviceNotFound {
                device: name.to_string(),
            });
        }

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if device.name().map(|n| is_preferred_device(&n)).unwrap_or(false) {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| GolosError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is owned by a single `CpalAudioSource`, which is only
/// ever driven from one thread at a time. Stream methods are called
/// synchronously and never cross thread boundaries.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Samples accumulated by the CPAL callback, drained by `read_chunk`.
struct SharedBuffer {
    samples: Mutex<Vec<i16>>,
    available: Condvar,
}

/// Opens one microphone stream per recording session.
pub struct CpalDeviceFactory {
    device_name: Option<String>,
}

impl CpalDeviceFactory {
    pub fn new(device_name: Option<&str>) -> Self {
        Self {
            device_name: device_name.map(str::to_string),
        }
    }
}

impl AudioSourceFactory for CpalDeviceFactory {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn AudioSource>> {
        let source = CpalAudioSource::open(self.device_name.as_deref(), format)?;
        Ok(Box::new(source))
    }
}

/// Live microphone input as fixed-size 16-bit PCM chunks.
///
/// The CPAL callback appends samples to a shared buffer; `read_chunk` blocks
/// until a full frame has accumulated (or briefly times out with an empty
/// chunk so the caller can check its stop signal).
///
/// Tries an i16 stream at the requested rate first, then f32 with software
/// conversion. PipeWire and PulseAudio resample transparently, so the
/// requested rate is accepted on any desktop setup.
pub struct CpalAudioSource {
    stream: Option<SendableStream>,
    shared: Arc<SharedBuffer>,
    frame_size: usize,
}

impl CpalAudioSource {
    /// Open the device and start the input stream.
    ///
    /// # Errors
    /// Returns `AudioDeviceNotFound` when no matching device exists and
    /// `AudioCapture` when the stream cannot be built or started.
    pub fn open(device_name: Option<&str>, format: &AudioFormat) -> Result<Self> {
        let device = find_device(device_name)?;
        let shared = Arc::new(SharedBuffer {
            samples: Mutex::new(Vec::new()),
            available: Condvar::new(),
        });

        let stream = build_stream(&device, format, Arc::clone(&shared))?;
        stream.play().map_err(|e| GolosError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        Ok(Self {
            stream: Some(SendableStream(stream)),
            shared,
            frame_size: format.frame_size,
        })
    }
}

fn build_stream(
    device: &cpal::Device,
    format: &AudioFormat,
    shared: Arc<SharedBuffer>,
) -> Result<cpal::Stream> {
    let config = cpal::StreamConfig {
        channels: format.channels,
        sample_rate: cpal::SampleRate(format.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let err_callback = |err| {
        eprintln!("golos: audio stream error: {}", err);
    };

    // i16 at the requested rate — the zero-conversion path
    let buffer = Arc::clone(&shared);
    if let Ok(stream) = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            if let Ok(mut samples) = buffer.samples.lock() {
                samples.extend_from_slice(data);
                buffer.available.notify_one();
            }
        },
        err_callback,
        None,
    ) {
        return Ok(stream);
    }

    // f32 for devices that only expose float formats
    let buffer = Arc::clone(&shared);
    device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut samples) = buffer.samples.lock() {
                    samples.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                    );
                    buffer.available.notify_one();
                }
            },
            err_callback,
            None,
        )
        .map_err(|e| GolosError::AudioCapture {
            message: format!("Failed to build input stream: {}", e),
        })
}

impl AudioSource for CpalAudioSource {
    fn read_chunk(&mut self) -> Result<AudioChunk> {
        if self.stream.is_none() {
            return Ok(AudioChunk::empty());
        }

        let mut samples = self
            .shared
            .samples
            .lock()
            .map_err(|e| GolosError::AudioCapture {
                message: format!("Failed to lock audio buffer: {}", e),
            })?;

        if samples.len() < self.frame_size {
            let (guard, _) = self
                .shared
                .available
                .wait_timeout(samples, READ_WAIT)
                .map_err(|e| GolosError::AudioCapture {
                    message: format!("Failed to wait on audio buffer: {}", e),
                })?;
            samples = guard;
        }

        if samples.len() < self.frame_size {
            return Ok(AudioChunk::empty());
        }

        let frame: Vec<i16> = samples.drain(..self.frame_size).collect();
        Ok(AudioChunk::new(frame))
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.0.pause();
        }
    }
}
