//! DSP primitives for ringmod.
//!
//! Wavetable oscillator, waveform generators and the planar audio buffer
//! the engine processes in place.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod audio_buffer;
mod channel_config;
mod waveform;
mod wavetable;

pub use audio_buffer::{AudioBuffer, BLOCK_SIZE, MAX_CHANNELS};
pub use channel_config::ChannelConfig;
pub use waveform::Waveform;
pub use wavetable::{Interpolation, WavetableError, WavetableOscillator, DEFAULT_TABLE_SIZE};
