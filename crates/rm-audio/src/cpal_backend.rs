//! CPAL-based duplex backend.
//!
//! The input callback pushes captured samples into a lock-free ring buffer;
//! the output callback pops them, runs the processor in place and hands the
//! block to the device. Neither callback allocates or locks.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig, SupportedBufferSize};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};
use rm_engine::{AudioProcessor, ChannelConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::traits::{AudioBackend, AudioError, StreamStats};

/// Both streams run in stereo; the processor sees interleaved L/R.
const CHANNELS: u16 = 2;

/// Used when the device does not report a buffer size range.
const FALLBACK_MAX_BLOCK: usize = 4096;

/// Releases the processor when the output stream drops its callback.
struct ProcessorSlot(Box<dyn AudioProcessor>);

impl Drop for ProcessorSlot {
    fn drop(&mut self) {
        self.0.release();
    }
}

struct ActiveStreams {
    // Field order is drop order: stop capture before playback.
    input: Stream,
    output: Stream,
}

/// Default-input → processor → default-output host.
pub struct CpalDuplex {
    input_device: Device,
    output_device: Device,
    config: StreamConfig,
    max_block_size: usize,
    streams: Option<ActiveStreams>,
    overruns: Arc<AtomicU64>,
    underruns: Arc<AtomicU64>,
}

impl CpalDuplex {
    /// Open the default devices, both at the output device's sample rate.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let output_device = host.default_output_device().ok_or(AudioError::NoDevice("output"))?;
        let input_device = host.default_input_device().ok_or(AudioError::NoDevice("input"))?;

        let supported = output_device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;
        let max_block_size = match supported.buffer_size() {
            SupportedBufferSize::Range { max, .. } => (*max as usize).clamp(64, FALLBACK_MAX_BLOCK),
            SupportedBufferSize::Unknown => FALLBACK_MAX_BLOCK,
        };

        let mut config: StreamConfig = supported.into();
        config.channels = CHANNELS;

        let input_name = input_device.name().unwrap_or_default();
        let output_name = output_device.name().unwrap_or_default();
        info!(
            input = %input_name,
            output = %output_name,
            sample_rate = config.sample_rate.0,
            max_block_size,
            "audio devices opened"
        );

        Ok(Self {
            input_device,
            output_device,
            config,
            max_block_size,
            streams: None,
            overruns: Arc::new(AtomicU64::new(0)),
            underruns: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            overruns: self.overruns.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
        }
    }

    fn build_input(&self, mut producer: ringbuf::HeapProd<f32>) -> Result<Stream, AudioError> {
        let overruns = self.overruns.clone();
        self.input_device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let pushed = producer.push_slice(data);
                    if pushed < data.len() {
                        overruns.fetch_add((data.len() - pushed) as u64, Ordering::Relaxed);
                    }
                },
                |err| error!("input stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))
    }

    fn build_output(
        &self,
        mut consumer: HeapCons<f32>,
        mut slot: ProcessorSlot,
    ) -> Result<Stream, AudioError> {
        let underruns = self.underruns.clone();
        let channels = self.config.channels as usize;
        self.output_device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    #[cfg(feature = "alloc_check")]
                    assert_no_alloc::assert_no_alloc(|| {
                        render(&mut consumer, slot.0.as_mut(), data, channels, &underruns)
                    });
                    #[cfg(not(feature = "alloc_check"))]
                    render(&mut consumer, slot.0.as_mut(), data, channels, &underruns);
                },
                |err| error!("output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))
    }
}

/// Output callback body: pull captured input, zero-fill any shortfall,
/// modulate in place.
fn render(
    consumer: &mut HeapCons<f32>,
    processor: &mut dyn AudioProcessor,
    data: &mut [f32],
    channels: usize,
    underruns: &AtomicU64,
) {
    let filled = consumer.pop_slice(data);
    if filled < data.len() {
        data[filled..].fill(0.0);
        underruns.fetch_add((data.len() - filled) as u64, Ordering::Relaxed);
    }
    processor.process_interleaved(data, channels);
}

impl AudioBackend for CpalDuplex {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn channels(&self) -> u16 {
        self.config.channels
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    fn start(&mut self, processor: Box<dyn AudioProcessor>) -> Result<(), AudioError> {
        if self.streams.is_some() {
            return Err(AudioError::AlreadyRunning);
        }
        if !processor.supports_layout(ChannelConfig::symmetric(self.config.channels)) {
            return Err(AudioError::UnsupportedLayout { channels: self.config.channels });
        }
        self.overruns.store(0, Ordering::Relaxed);
        self.underruns.store(0, Ordering::Relaxed);

        // About 100ms of interleaved audio.
        let capacity = (self.config.sample_rate.0 as usize / 10) * self.config.channels as usize;
        let (producer, consumer) = HeapRb::<f32>::new(capacity.max(1)).split();

        let output = self.build_output(consumer, ProcessorSlot(processor))?;
        let input = self.build_input(producer)?;
        output.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        input.play().map_err(|e| AudioError::Playback(e.to_string()))?;

        self.streams = Some(ActiveStreams { input, output });
        info!("duplex stream started");
        Ok(())
    }

    fn stop(&mut self) -> Result<StreamStats, AudioError> {
        if let Some(streams) = self.streams.take() {
            streams.input.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
            streams.output.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
            drop(streams);
            let stats = self.stats();
            if stats.overruns > 0 || stats.underruns > 0 {
                warn!(
                    overruns = stats.overruns,
                    underruns = stats.underruns,
                    "audio bridge dropped samples"
                );
            }
            info!("duplex stream stopped");
        }
        Ok(self.stats())
    }

    fn is_running(&self) -> bool {
        self.streams.is_some()
    }
}

impl Drop for CpalDuplex {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("failed to stop stream cleanly: {}", e);
        }
    }
}
