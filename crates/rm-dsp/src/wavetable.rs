//! Single-cycle wavetable oscillator.
//!
//! One period of a waveform is computed up front so the per-sample cost is a
//! table read and a phase step. `configure` allocates; everything else is
//! safe to call from the audio thread.

use alloc::vec::Vec;
use core::f64::consts::TAU;

use thiserror::Error;

/// Table length used when the caller has no preference.
pub const DEFAULT_TABLE_SIZE: usize = 1024;

/// Errors raised while (re)building the table.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WavetableError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),
    #[error("table size must be at least 1, got {0}")]
    InvalidTableSize(usize),
}

/// How a fractional phase is turned into a table value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// `table[floor(phase)]`.
    #[default]
    Truncate,
    /// Straight line between `table[i]` and `table[(i + 1) % N]`.
    Linear,
}

/// Phase-accumulating reader over a precomputed single-cycle table.
///
/// Invariant: `0 <= phase < table.len()` after every public call.
#[derive(Clone, Debug)]
pub struct WavetableOscillator {
    table: Vec<f32>,
    phase: f64,
    increment: f64,
    frequency: f32,
    sample_rate: f64,
    interpolation: Interpolation,
}

impl WavetableOscillator {
    /// Build an oscillator with a freshly generated table. Frequency starts at 0.
    pub fn new<F>(sample_rate: f64, table_size: usize, generator: F) -> Result<Self, WavetableError>
    where
        F: Fn(f64) -> f32,
    {
        let mut osc = Self {
            table: Vec::new(),
            phase: 0.0,
            increment: 0.0,
            frequency: 0.0,
            sample_rate: 0.0,
            interpolation: Interpolation::Truncate,
        };
        osc.configure(sample_rate, table_size, generator)?;
        Ok(osc)
    }

    /// Regenerate the table and rebase the increment on the new sample rate.
    ///
    /// Entry `i` is `generator(2π·i/table_size)`, with the angle computed in
    /// f64. Phase resets to 0. On error
    /// the oscillator is left exactly as it was.
    pub fn configure<F>(
        &mut self,
        sample_rate: f64,
        table_size: usize,
        generator: F,
    ) -> Result<(), WavetableError>
    where
        F: Fn(f64) -> f32,
    {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(WavetableError::InvalidSampleRate(sample_rate));
        }
        if table_size == 0 {
            return Err(WavetableError::InvalidTableSize(table_size));
        }

        self.table.clear();
        self.table.reserve_exact(table_size);
        self.table.extend(
            (0..table_size).map(|i| generator(TAU * i as f64 / table_size as f64)),
        );
        self.sample_rate = sample_rate;
        self.phase = 0.0;
        self.set_frequency(self.frequency);
        Ok(())
    }

    /// Set the playback frequency in Hz.
    ///
    /// Zero, negative and non-finite values freeze the phase.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        let increment = f64::from(frequency) * self.table.len() as f64 / self.sample_rate;
        self.increment = if frequency > 0.0 && increment.is_finite() {
            increment
        } else {
            0.0
        };
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Read the value at the current phase, then step the phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let value = self.current();
        self.advance();
        value
    }

    /// Step the phase without reading the table.
    #[inline]
    pub fn advance(&mut self) {
        self.phase = (self.phase + self.increment) % self.table.len() as f64;
    }

    /// Value at the current phase, without stepping.
    #[inline]
    pub fn current(&self) -> f32 {
        let index = self.phase as usize;
        match self.interpolation {
            Interpolation::Truncate => self.table[index],
            Interpolation::Linear => {
                let next = if index + 1 == self.table.len() { 0 } else { index + 1 };
                let frac = (self.phase - index as f64) as f32;
                let a = self.table[index];
                a + frac * (self.table[next] - a)
            }
        }
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }

    pub fn table_size(&self) -> usize {
        self.table.len()
    }
}
