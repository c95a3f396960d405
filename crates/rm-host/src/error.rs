//! Error types for the controller.

use rm_audio::AudioError;
use rm_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

use crate::wav::WavError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Wav(#[from] WavError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode WAV")]
    Encode(#[source] std::io::Error),
    #[error("processor rejected {0} channel layout")]
    UnsupportedLayout(u16),
}
