//! Headless controller for ringmod.
//!
//! Provides one API for live duplex sessions and offline file rendering that
//! the CLI (or any other front end) can share.

mod error;
mod meter;
mod offline;
mod settings;
mod wav;

use rm_audio::{AudioBackend, CpalDuplex, StreamStats};
use rm_engine::{ParamHandle, RingModEngine};
use std::path::Path;
use tracing::info;

pub use error::{HostError, SettingsError};
pub use meter::{ActivityMeter, METER_RATE_HZ};
pub use offline::render_offline;
pub use settings::{clamp_frequency, Settings, FREQUENCY_MAX, FREQUENCY_MIN};
pub use wav::{load_wav, wav_to_bytes, write_wav, WavData, WavError};

// Re-export common types so callers don't need rm-engine/rm-audio directly.
pub use rm_audio::AudioError;
pub use rm_engine::{EngineConfig, EngineError};

/// Owns the session settings and at most one live stream.
pub struct Controller {
    settings: Settings,
    live: Option<CpalDuplex>,
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        Self { settings, live: None }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A fresh, unprepared engine configured from the current settings.
    pub fn build_engine(&self) -> RingModEngine {
        RingModEngine::new(self.settings.engine_config())
    }

    // --- Offline rendering ---

    pub fn render_wav(&self, input: &WavData) -> Result<WavData, HostError> {
        let mut engine = self.build_engine();
        render_offline(&mut engine, input, self.settings.block_size)
    }

    pub fn render_bytes(&self, input: &[u8]) -> Result<Vec<u8>, HostError> {
        let wav = load_wav(input)?;
        wav_to_bytes(&self.render_wav(&wav)?).map_err(HostError::Encode)
    }

    pub fn render_file(&self, input: &Path, output: &Path) -> Result<(), HostError> {
        let bytes = std::fs::read(input).map_err(|source| HostError::Io {
            path: input.to_path_buf(),
            source,
        })?;
        let rendered = self.render_bytes(&bytes)?;
        std::fs::write(output, rendered).map_err(|source| HostError::Io {
            path: output.to_path_buf(),
            source,
        })?;
        info!(input = %input.display(), output = %output.display(), "wrote render");
        Ok(())
    }

    // --- Live duplex session ---

    /// Open the default devices and start modulating. Returns the handle the
    /// caller uses to turn the dial and poll the indicator.
    pub fn start_live(&mut self) -> Result<ParamHandle, HostError> {
        self.stop_live()?;

        let mut backend = CpalDuplex::new()?;
        let mut engine = self.build_engine();
        engine.prepare(f64::from(backend.sample_rate()), backend.max_block_size())?;
        let params = engine.params();
        backend.start(Box::new(engine))?;
        info!(
            sample_rate = backend.sample_rate(),
            channels = backend.channels(),
            max_block_size = backend.max_block_size(),
            "live session started"
        );

        self.live = Some(backend);
        Ok(params)
    }

    /// Stop the live session, if any, and report how many samples the
    /// input/output bridge dropped.
    pub fn stop_live(&mut self) -> Result<Option<StreamStats>, HostError> {
        match self.live.take() {
            Some(mut backend) => Ok(Some(backend.stop()?)),
            None => Ok(None),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.as_ref().is_some_and(|b| b.is_running())
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
