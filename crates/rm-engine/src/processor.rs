//! Host adapter trait for block-based audio effects.

use rm_dsp::{AudioBuffer, ChannelConfig};

use crate::engine::EngineError;

/// Static metadata a host shim reports for a processor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProcessorInfo {
    pub name: &'static str,
    pub vendor: &'static str,
    pub tail_seconds: f64,
    pub accepts_midi: bool,
    pub produces_midi: bool,
}

/// What a host needs from an in-place effect.
///
/// `prepare` and `release` run on a non-realtime thread. The `process*`
/// methods run on the audio thread and must not block or allocate.
pub trait AudioProcessor: Send {
    fn info(&self) -> &ProcessorInfo;

    /// Whether the processor can run with the given bus layout.
    fn supports_layout(&self, layout: ChannelConfig) -> bool;

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<(), EngineError>;

    /// Process a planar block in place.
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Process an interleaved block in place.
    fn process_interleaved(&mut self, data: &mut [f32], channels: usize);

    fn release(&mut self);
}
