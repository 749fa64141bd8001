//! Error types for the audio service.
//!
//! None of these escape the public playback API; they are logged and the
//! failing call degrades to silence.

use thiserror::Error;

/// Audio service error types.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device could be opened.
    #[error("Audio output unavailable: {0}")]
    DeviceUnavailable(String),

    /// Tone parameters the oscillator cannot render.
    #[error("Invalid tone parameters (frequency {frequency} Hz, duration {duration} s)")]
    InvalidTone {
        /// Requested frequency.
        frequency: f32,
        /// Requested duration.
        duration: f32,
    },

    /// The device rejected a voice.
    #[error("Failed to synthesize voice: {0}")]
    Synthesis(String),

    /// Settings storage failed.
    #[error("Storage error for key '{key}': {message}")]
    Storage {
        /// Storage key being accessed.
        key: String,
        /// Error message.
        message: String,
    },

    /// Settings could not be (de)serialized.
    #[error("Settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;
