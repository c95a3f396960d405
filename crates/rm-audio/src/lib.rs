//! Audio device backends for ringmod.
//!
//! Stands in for a plugin host: captures an input device, runs an
//! [`rm_engine::AudioProcessor`] inside the output callback and plays the
//! result.

mod cpal_backend;
mod traits;

pub use cpal_backend::CpalDuplex;
pub use traits::{AudioBackend, AudioError, StreamStats};
