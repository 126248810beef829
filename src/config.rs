use crate::audio::AudioFormat;
use crate::defaults;
use crate::error::{GolosError, Result};
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub recognition: RecognitionConfig,
    pub model: ModelConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub frame_size: usize,
}

/// Recognition loop tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionConfig {
    pub queue_capacity: usize,
    pub poll_timeout_ms: u64,
    pub partial_repeat_cap: u32,
}

/// Model location configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelConfig {
    pub path: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            frame_size: defaults::FRAME_SIZE,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: defaults::QUEUE_CAPACITY,
            poll_timeout_ms: defaults::POLL_TIMEOUT.as_millis() as u64,
            partial_repeat_cap: defaults::PARTIAL_REPEAT_CAP,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GolosError::ConfigFileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                GolosError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Panics on invalid TOML so a broken file never goes unnoticed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(GolosError::ConfigFileNotFound { .. }) => Self::default(),
            Err(e) => {
                panic!("Failed to load config from {}: {}", path.display(), e);
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - GOLOS_MODEL → model.path
    /// - GOLOS_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("GOLOS_MODEL") {
            if !model.is_empty() {
                self.model.path = Some(PathBuf::from(model));
            }
        }

        if let Ok(device) = std::env::var("GOLOS_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/golos/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("golos")
            .join("config.toml")
    }

    /// Session parameters derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            format: AudioFormat {
                sample_rate: self.audio.sample_rate,
                channels: defaults::CHANNELS,
                frame_size: self.audio.frame_size,
            },
            queue_capacity: self.recognition.queue_capacity,
            poll_timeout: Duration::from_millis(self.recognition.poll_timeout_ms),
            partial_repeat_cap: self.recognition.partial_repeat_cap,
        }
    }
}
