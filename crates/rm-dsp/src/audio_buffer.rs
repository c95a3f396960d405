//! Multichannel f32 audio buffer with planar layout.

use alloc::vec;
use alloc::vec::Vec;

/// Maximum number of audio channels per buffer.
pub const MAX_CHANNELS: u16 = 8;

/// Default block size for audio processing.
pub const BLOCK_SIZE: usize = 512;

/// A multichannel f32 audio buffer in planar layout.
///
/// Storage is allocated once for `capacity` frames per channel. The number of
/// active frames can shrink and grow within that capacity without touching
/// the allocator, so a host can reuse one buffer for a short final block.
///
/// `data[ch * capacity + frame]` gives the sample for channel `ch` at `frame`.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    data: Vec<f32>,
    channels: u16,
    frames: usize,
    capacity: usize,
}

impl AudioBuffer {
    /// Create a new silent buffer with the given dimensions.
    pub fn new(channels: u16, frames: usize) -> Self {
        let channels = channels.min(MAX_CHANNELS);
        Self {
            data: vec![0.0; channels as usize * frames],
            channels,
            frames,
            capacity: frames,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of active frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Change the active frame count, clamped to capacity. Never allocates.
    pub fn set_frames(&mut self, frames: usize) {
        self.frames = frames.min(self.capacity);
    }

    /// Read-only access to one channel's active samples.
    pub fn channel(&self, ch: u16) -> &[f32] {
        let start = ch as usize * self.capacity;
        &self.data[start..start + self.frames]
    }

    /// Mutable access to one channel's active samples.
    pub fn channel_mut(&mut self, ch: u16) -> &mut [f32] {
        let start = ch as usize * self.capacity;
        let len = self.frames;
        &mut self.data[start..start + len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_silent() {
        let buf = AudioBuffer::new(2, 4);
        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.frames(), 4);
        assert!(buf.channel(0).iter().all(|&s| s == 0.0));
        assert!(buf.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn channel_count_is_capped() {
        let buf = AudioBuffer::new(MAX_CHANNELS + 4, 2);
        assert_eq!(buf.channels(), MAX_CHANNELS);
    }

    #[test]
    fn channel_mut_writes_correctly() {
        let mut buf = AudioBuffer::new(2, 2);
        buf.channel_mut(0)[0] = 1.0;
        buf.channel_mut(1)[1] = -0.5;
        assert_eq!(buf.channel(0), &[1.0, 0.0]);
        assert_eq!(buf.channel(1), &[0.0, -0.5]);
    }

    #[test]
    fn set_frames_shrinks_view_within_capacity() {
        let mut buf = AudioBuffer::new(2, 8);
        buf.channel_mut(1)[0] = 0.25;
        buf.set_frames(3);
        assert_eq!(buf.frames(), 3);
        assert_eq!(buf.channel(1), &[0.25, 0.0, 0.0]);

        buf.set_frames(100);
        assert_eq!(buf.frames(), 8);
    }
}
