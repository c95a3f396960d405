//! Ring modulation engine for ringmod.
//!
//! Owns the carrier oscillator, exposes lock-free control parameters to a
//! view layer and multiplies each audio block by the carrier on the audio
//! thread.

mod activity;
mod denormal;
mod engine;
mod params;
mod processor;

pub use activity::ActivitySmoother;
pub use denormal::DenormalGuard;
pub use engine::{EngineConfig, EngineError, EngineState, RingModEngine};
pub use params::{AtomicF32, ParamHandle, SharedParams};
pub use processor::{AudioProcessor, ProcessorInfo};

pub use rm_dsp::{AudioBuffer, ChannelConfig, Interpolation, Waveform};
