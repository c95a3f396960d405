//! The ring modulator: input × carrier, one carrier value per sample frame.
//!
//! Lifecycle is `Unprepared → Prepared → Processing → Released`, with
//! `prepare` allowed again from `Released`. Processing outside
//! `Prepared`/`Processing` is a programmer error and panics.
//!
//! Bypass keeps the carrier running: while disabled the oscillator still
//! steps once per frame, so re-enabling resumes at the phase it would have
//! had if the effect had never been bypassed.

use std::sync::Arc;

use rm_dsp::{
    AudioBuffer, ChannelConfig, Interpolation, Waveform, WavetableError, WavetableOscillator,
    BLOCK_SIZE, DEFAULT_TABLE_SIZE,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::activity::ActivitySmoother;
use crate::denormal::DenormalGuard;
use crate::params::{ParamHandle, SharedParams};
use crate::processor::{AudioProcessor, ProcessorInfo};

static INFO: ProcessorInfo = ProcessorInfo {
    name: "RingMod",
    vendor: "ringmod",
    tail_seconds: 0.0,
    accepts_midi: false,
    produces_midi: false,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Wavetable(#[from] WavetableError),
    #[error("activity time must be finite and non-negative, got {0} ms")]
    InvalidActivityTime(f32),
}

/// Where the engine is in its host session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Unprepared,
    Prepared,
    Processing,
    Released,
}

/// Session defaults. Applied once at construction (parameters) and at every
/// `prepare` (table shape).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub table_size: usize,
    pub waveform: Waveform,
    pub interpolation: Interpolation,
    pub default_frequency: f32,
    pub amplitude: f32,
    pub enabled: bool,
    pub activity_time_ms: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            waveform: Waveform::Sine,
            interpolation: Interpolation::Truncate,
            default_frequency: 440.0,
            amplitude: 0.5,
            enabled: true,
            activity_time_ms: 80.0,
        }
    }
}

pub struct RingModEngine {
    config: EngineConfig,
    params: Arc<SharedParams>,
    oscillator: Option<WavetableOscillator>,
    /// Carrier values for the current block, sized from the block-size hint.
    carrier: Vec<f32>,
    activity: ActivitySmoother,
    state: EngineState,
    sample_rate: f64,
}

impl RingModEngine {
    pub fn new(config: EngineConfig) -> Self {
        let params = SharedParams::new(config.default_frequency, config.amplitude, config.enabled);
        Self {
            config,
            params: Arc::new(params),
            oscillator: None,
            carrier: Vec::new(),
            activity: ActivitySmoother::new(if config.enabled { 1.0 } else { 0.0 }),
            state: EngineState::Unprepared,
            sample_rate: 0.0,
        }
    }

    /// Allocate the carrier table and scratch space for a new sample rate.
    ///
    /// Not realtime-safe. On error the engine keeps whatever it had before.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<(), EngineError> {
        let time_ms = self.config.activity_time_ms;
        if !(time_ms >= 0.0 && time_ms.is_finite()) {
            return Err(EngineError::InvalidActivityTime(time_ms));
        }

        let waveform = self.config.waveform;
        let mut osc = WavetableOscillator::new(sample_rate, self.config.table_size, |angle| {
            waveform.sample(angle)
        })?;
        osc.set_interpolation(self.config.interpolation);
        osc.set_frequency(self.params.frequency());

        let block = if max_block_size == 0 { BLOCK_SIZE } else { max_block_size };
        self.carrier.clear();
        self.carrier.resize(block, 0.0);
        self.activity.set_time(time_ms, sample_rate);
        self.oscillator = Some(osc);
        self.sample_rate = sample_rate;
        self.state = EngineState::Prepared;

        info!(
            sample_rate,
            block,
            table_size = self.config.table_size,
            waveform = waveform.name(),
            "ring modulator prepared"
        );
        Ok(())
    }

    /// Drop the carrier table and scratch space.
    pub fn release(&mut self) {
        self.oscillator = None;
        self.carrier = Vec::new();
        if self.state != EngineState::Unprepared {
            self.state = EngineState::Released;
        }
        debug!("ring modulator released");
    }

    /// Process a planar buffer in place.
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        let frames = buffer.frames();
        let channels = buffer.channels();
        self.modulate(frames, |offset, carrier| {
            for ch in 0..channels {
                let samples = &mut buffer.channel_mut(ch)[offset..offset + carrier.len()];
                for (s, &c) in samples.iter_mut().zip(carrier) {
                    *s *= c;
                }
            }
        });
    }

    /// Process host-owned channel slices in place. The block length is the
    /// shortest slice.
    pub fn process_planar(&mut self, channels: &mut [&mut [f32]]) {
        let frames = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);
        self.modulate(frames, |offset, carrier| {
            for ch in channels.iter_mut() {
                let samples = &mut ch[offset..offset + carrier.len()];
                for (s, &c) in samples.iter_mut().zip(carrier) {
                    *s *= c;
                }
            }
        });
    }

    /// Process interleaved samples in place. A trailing partial frame is
    /// left untouched.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let frames = data.len() / channels;
        self.modulate(frames, |offset, carrier| {
            let start = offset * channels;
            let block = &mut data[start..start + carrier.len() * channels];
            for (frame, &c) in block.chunks_exact_mut(channels).zip(carrier) {
                for s in frame {
                    *s *= c;
                }
            }
        });
    }

    /// Shared per-block driver. Reads the parameters once, fills carrier
    /// values chunk by chunk and hands each chunk to `apply(frame_offset, carrier)`.
    /// When bypassed, `apply` is never called but the phase still advances.
    #[inline]
    fn modulate<F>(&mut self, frames: usize, mut apply: F)
    where
        F: FnMut(usize, &[f32]),
    {
        let Some(osc) = self.oscillator.as_mut() else {
            panic!(
                "RingModEngine::process called in {:?} state; prepare() must succeed first",
                self.state
            );
        };
        self.state = EngineState::Processing;
        let _denormals = DenormalGuard::new();

        let frequency = self.params.frequency();
        if frequency.to_bits() != osc.frequency().to_bits() {
            osc.set_frequency(frequency);
        }
        let enabled = self.params.is_enabled();
        let amplitude = self.params.amplitude();

        if enabled {
            let mut offset = 0;
            while offset < frames {
                let len = (frames - offset).min(self.carrier.len());
                let carrier = &mut self.carrier[..len];
                for c in carrier.iter_mut() {
                    *c = osc.next_sample() * amplitude;
                }
                apply(offset, carrier);
                offset += len;
            }
        } else {
            for _ in 0..frames {
                osc.advance();
            }
        }

        let level = self.activity.update(enabled, frames);
        self.params.publish_activity(level);
    }

    pub fn set_frequency(&self, hz: f32) {
        self.params.set_frequency(hz);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.params.set_enabled(enabled);
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        self.params.set_amplitude(amplitude);
    }

    /// Smoothed 0..1 enabled indicator published by the last processed block.
    pub fn activity_level(&self) -> f32 {
        self.params.activity_level()
    }

    /// Handle for a view layer living on another thread.
    pub fn params(&self) -> ParamHandle {
        ParamHandle::new(self.params.clone())
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn oscillator(&self) -> Option<&WavetableOscillator> {
        self.oscillator.as_ref()
    }

    /// Mono or stereo, with the output mirroring the input.
    pub fn supports_layout(&self, layout: ChannelConfig) -> bool {
        layout.is_symmetric() && (layout.outputs == 1 || layout.outputs == 2)
    }
}

impl Default for RingModEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AudioProcessor for RingModEngine {
    fn info(&self) -> &ProcessorInfo {
        &INFO
    }

    fn supports_layout(&self, layout: ChannelConfig) -> bool {
        RingModEngine::supports_layout(self, layout)
    }

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<(), EngineError> {
        RingModEngine::prepare(self, sample_rate, max_block_size)
    }

    fn process(&mut self, buffer: &mut AudioBuffer) {
        RingModEngine::process(self, buffer);
    }

    fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        RingModEngine::process_interleaved(self, data, channels);
    }

    fn release(&mut self) {
        RingModEngine::release(self);
    }
}
