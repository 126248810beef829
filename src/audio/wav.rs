//! WAV files as a finite audio source, mostly for offline runs and tests.

use crate::audio::source::{AudioChunk, AudioFormat, AudioSource, AudioSourceFactory};
use crate::error::{GolosError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Audio source that reads from WAV file data.
///
/// Supports arbitrary sample rates and channels, downmixing and resampling
/// to the target format. Yields `frame_size` chunks, a final short chunk,
/// then empty chunks forever.
pub struct WavAudioSource {
    samples: Vec<i16>,
    position: usize,
    frame_size: usize,
}

impl WavAudioSource {
    /// Create from any reader.
    pub fn from_reader(reader: Box<dyn Read + Send>, format: &AudioFormat) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| GolosError::AudioRead {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let source_channels = spec.channels;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GolosError::AudioRead {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        let mono_samples = if source_channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|pair| {
                    let left = pair[0] as i32;
                    let right = pair[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else {
            raw_samples
        };

        let samples = if source_rate != format.sample_rate {
            resample(&mono_samples, source_rate, format.sample_rate)
        } else {
            mono_samples
        };

        Ok(Self {
            samples,
            position: 0,
            frame_size: format.frame_size,
        })
    }

    /// Create from a file on disk.
    pub fn from_file(path: &Path, format: &AudioFormat) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(file), format)
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl AudioSource for WavAudioSource {
    fn read_chunk(&mut self) -> Result<AudioChunk> {
        if self.position >= self.samples.len() {
            return Ok(AudioChunk::empty());
        }

        let end = std::cmp::min(self.position + self.frame_size, self.samples.len());
        let chunk = AudioChunk::new(self.samples[self.position..end].to_vec());
        self.position = end;

        Ok(chunk)
    }

    fn close(&mut self) {
        self.position = self.samples.len();
    }
}

/// Opens a WAV file once per session, replaying it from the start.
pub struct WavFileFactory {
    path: PathBuf,
}

impl WavFileFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AudioSourceFactory for WavFileFactory {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn AudioSource>> {
        let source = WavAudioSource::from_file(&self.path, format)?;
        Ok(Box::new(source))
    }
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
