//! Audio backend trait and error types.

use rm_engine::AudioProcessor;
use thiserror::Error;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no {0} device available")]
    NoDevice(&'static str),
    #[error("device init error: {0}")]
    DeviceInit(String),
    #[error("stream create error: {0}")]
    StreamCreate(String),
    #[error("playback error: {0}")]
    Playback(String),
    #[error("processor rejected {channels} channel layout")]
    UnsupportedLayout { channels: u16 },
    #[error("stream already running")]
    AlreadyRunning,
}

/// Sample counts lost at the input/output bridge since the stream started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Input samples dropped because the bridge was full.
    pub overruns: u64,
    /// Output samples zero-filled because the bridge was empty.
    pub underruns: u64,
}

/// A device host that drives an in-place processor.
pub trait AudioBackend {
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Largest callback size the device is expected to request.
    fn max_block_size(&self) -> usize;

    /// Move a prepared processor onto the audio thread and start streaming.
    fn start(&mut self, processor: Box<dyn AudioProcessor>) -> Result<(), AudioError>;

    /// Stop streaming and release the processor.
    fn stop(&mut self) -> Result<StreamStats, AudioError>;

    fn is_running(&self) -> bool;
}
