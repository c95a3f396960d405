//! Block-by-block offline rendering through any [`AudioProcessor`].

use rm_dsp::{AudioBuffer, ChannelConfig, BLOCK_SIZE};
use rm_engine::AudioProcessor;
use tracing::{debug, info};

use crate::error::HostError;
use crate::wav::WavData;

/// Run `input` through `processor` in blocks of `block_size` frames and
/// return the processed audio.
///
/// The processor is prepared at the file's sample rate and released when
/// rendering ends. A `block_size` of 0 uses [`BLOCK_SIZE`].
pub fn render_offline(
    processor: &mut dyn AudioProcessor,
    input: &WavData,
    block_size: usize,
) -> Result<WavData, HostError> {
    let channels = input.num_channels();
    if channels == 0 || !processor.supports_layout(ChannelConfig::symmetric(channels)) {
        return Err(HostError::UnsupportedLayout(channels));
    }
    let block_size = if block_size == 0 { BLOCK_SIZE } else { block_size };
    let frames = input.frames();

    processor.prepare(f64::from(input.sample_rate), block_size)?;

    let mut output: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    let mut buffer = AudioBuffer::new(channels, block_size);
    let mut offset = 0;
    let mut blocks = 0usize;

    while offset < frames {
        let len = (frames - offset).min(block_size);
        buffer.set_frames(len);
        for ch in 0..channels {
            let src = &input.channels[ch as usize][offset..offset + len];
            buffer.channel_mut(ch).copy_from_slice(src);
        }

        processor.process(&mut buffer);

        for ch in 0..channels {
            output[ch as usize].extend_from_slice(buffer.channel(ch));
        }
        offset += len;
        blocks += 1;
    }

    processor.release();
    debug!(blocks, block_size, "offline render finished");
    info!(
        frames,
        channels,
        sample_rate = input.sample_rate,
        processor = processor.info().name,
        "rendered"
    );
    Ok(WavData::new(input.sample_rate, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rm_engine::{EngineConfig, EngineState, RingModEngine};

    fn ones(channels: usize, frames: usize) -> WavData {
        WavData::new(48000, vec![vec![1.0; frames]; channels])
    }

    #[test]
    fn block_size_does_not_change_the_result() {
        let input = ones(2, 1000);
        let mut a = RingModEngine::default();
        let mut b = RingModEngine::default();
        let whole = render_offline(&mut a, &input, 1000).unwrap();
        let pieces = render_offline(&mut b, &input, 37).unwrap();
        assert_eq!(whole, pieces);
    }

    #[test]
    fn channels_share_the_carrier() {
        let out = render_offline(&mut RingModEngine::default(), &ones(2, 300), 64).unwrap();
        assert_eq!(out.channels[0], out.channels[1]);
        assert_eq!(out.frames(), 300);
        assert_eq!(out.sample_rate, 48000);
    }

    #[test]
    fn bypassed_render_is_identity() {
        let input = WavData::new(44100, vec![(0..500).map(|i| (i as f32 * 0.013).sin()).collect()]);
        let mut engine =
            RingModEngine::new(EngineConfig { enabled: false, ..EngineConfig::default() });
        let out = render_offline(&mut engine, &input, 128).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn engine_is_released_afterwards() {
        let mut engine = RingModEngine::default();
        render_offline(&mut engine, &ones(1, 10), 0).unwrap();
        assert_eq!(engine.state(), EngineState::Released);
    }

    #[test]
    fn empty_input_renders_empty_output() {
        let out = render_offline(&mut RingModEngine::default(), &ones(1, 0), 64).unwrap();
        assert_eq!(out.frames(), 0);
        assert_eq!(out.num_channels(), 1);
    }

    #[test]
    fn rejects_unsupported_layout() {
        let input = ones(3, 10);
        assert!(matches!(
            render_offline(&mut RingModEngine::default(), &input, 64),
            Err(HostError::UnsupportedLayout(3))
        ));
    }
}
