use thiserror::Error;

use crate::dsp::NoiseError;

/// Failures surfaced by the playback controller
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] NoiseError),

    #[error("audio output device unavailable: {0}")]
    AudioDeviceUnavailable(String),

    #[error("noise producer stopped responding")]
    EngineDisconnected,

    #[error("failed to spawn noise producer thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl PlaybackError {
    pub fn device(err: impl std::fmt::Display) -> Self {
        PlaybackError::AudioDeviceUnavailable(err.to_string())
    }
}
