//! Default configuration constants for golos.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Number of audio channels. Recognition operates on mono input only.
pub const CHANNELS: u16 = 1;

/// Samples per capture read.
///
/// One chunk is 8192 samples of 16-bit PCM, roughly half a second of audio
/// at 16kHz. This is also the worst-case stop latency of the capture loop,
/// since cancellation is only observed between reads.
pub const FRAME_SIZE: usize = 8192;

/// Capacity of the capture-to-recognition chunk queue.
///
/// When the recognizer cannot keep up, the newest chunk is dropped rather
/// than evicting queued audio, preserving continuity of what is already
/// buffered.
pub const QUEUE_CAPACITY: usize = 10;

/// How long the recognition loop waits for a chunk before re-checking
/// its cancellation flag.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Maximum consecutive emissions of an identical partial hypothesis.
///
/// A stable, slowly-finalizing hypothesis repeats on every chunk; beyond
/// this count the repeats are suppressed until the text changes or a final
/// result arrives.
pub const PARTIAL_REPEAT_CAP: u32 = 3;

/// Returns the duration of one capture frame at the given sample rate.
pub fn frame_period(sample_rate: u32) -> Duration {
    Duration::from_secs_f64(FRAME_SIZE as f64 / sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_period_at_default_rate_is_half_a_second() {
        let period = frame_period(SAMPLE_RATE);
        assert_eq!(period, Duration::from_secs_f64(8192.0 / 16000.0));
        assert!(period > Duration::from_millis(500));
        assert!(period < Duration::from_millis(520));
    }

    #[test]
    fn fixed_parameters_match_documented_values() {
        assert_eq!(SAMPLE_RATE, 16000);
        assert_eq!(CHANNELS, 1);
        assert_eq!(FRAME_SIZE, 8192);
        assert_eq!(QUEUE_CAPACITY, 10);
        assert_eq!(POLL_TIMEOUT, Duration::from_millis(100));
        assert_eq!(PARTIAL_REPEAT_CAP, 3);
    }
}
