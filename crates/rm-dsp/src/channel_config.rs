//! Channel layout negotiated between a host and a processor.

/// Channel configuration for an audio processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    pub inputs: u16,
    pub outputs: u16,
}

impl ChannelConfig {
    pub const MONO: Self = Self { inputs: 1, outputs: 1 };
    pub const STEREO: Self = Self { inputs: 2, outputs: 2 };

    /// Same channel count on both sides.
    pub const fn symmetric(channels: u16) -> Self {
        Self { inputs: channels, outputs: channels }
    }

    /// True if the output layout mirrors the input layout.
    pub fn is_symmetric(&self) -> bool {
        self.inputs == self.outputs
    }
}
