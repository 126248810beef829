//! Error types for golos.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GolosError {
    // Configuration errors
    #[error("Configuration file not found at {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    #[error("Audio read failed: {message}")]
    AudioRead { message: String },

    // Recognition errors
    #[error("Recognition model failed to load from {path}")]
    ModelLoad { path: String },

    #[error("Recognizer creation failed: {message}")]
    RecognizerCreate { message: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Session errors
    #[error("No recognition model is loaded")]
    ModelNotLoaded,

    #[error("A recording session is already active")]
    AlreadyRecording,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, GolosError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = GolosError::ConfigFileNotFound {
            path: PathBuf::from("/path/to/config.toml"),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_audio_device_not_found_display() {
        let error = GolosError::AudioDeviceNotFound {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio device not found: default");
    }

    #[test]
    fn test_audio_capture_display() {
        let error = GolosError::AudioCapture {
            message: "stream build failed".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Audio capture failed: stream build failed"
        );
    }

    #[test]
    fn test_audio_read_display() {
        let error = GolosError::AudioRead {
            message: "device disconnected".to_string(),
        };
        assert_eq!(error.to_string(), "Audio read failed: device disconnected");
    }

    #[test]
    fn test_model_load_display() {
        let error = GolosError::ModelLoad {
            path: "/models/vosk-model-small-ru".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition model failed to load from /models/vosk-model-small-ru"
        );
    }

    #[test]
    fn test_recognizer_create_display() {
        let error = GolosError::RecognizerCreate {
            message: "unsupported sample rate".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognizer creation failed: unsupported sample rate"
        );
    }

    #[test]
    fn test_model_not_loaded_display() {
        assert_eq!(
            GolosError::ModelNotLoaded.to_string(),
            "No recognition model is loaded"
        );
    }

    #[test]
    fn test_already_recording_display() {
        assert_eq!(
            GolosError::AlreadyRecording.to_string(),
            "A recording session is already active"
        );
    }

    #[test]
    fn test_other_display() {
        let error = GolosError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: GolosError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: GolosError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<GolosError>();
        assert_sync::<GolosError>();
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: GolosError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }
}
