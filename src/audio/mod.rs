//! Audio capture: device abstraction and concrete sources.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod source;
pub mod wav;

#[cfg(feature = "cpal-audio")]
pub use capture::{CpalAudioSource, CpalDeviceFactory};
pub use source::{AudioChunk, AudioFormat, AudioSource, AudioSourceFactory};
pub use wav::{WavAudioSource, WavFileFactory};
