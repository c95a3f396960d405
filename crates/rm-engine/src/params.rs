//! Control parameters shared between the view layer and the audio thread.
//!
//! Each field is an independent single-writer atomic. Loads and stores use
//! `Relaxed`: no field's value depends on another, and a stale read is at
//! most one block old.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// An `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Live parameter state for one engine.
///
/// `frequency`, `enabled` and `amplitude` are written by the control thread
/// and read by the audio thread. `activity` goes the other way.
#[derive(Debug)]
pub struct SharedParams {
    frequency: AtomicF32,
    enabled: AtomicBool,
    amplitude: AtomicF32,
    activity: AtomicF32,
}

impl SharedParams {
    pub fn new(frequency: f32, amplitude: f32, enabled: bool) -> Self {
        Self {
            frequency: AtomicF32::new(frequency),
            enabled: AtomicBool::new(enabled),
            amplitude: AtomicF32::new(amplitude),
            activity: AtomicF32::new(if enabled { 1.0 } else { 0.0 }),
        }
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency.load()
    }

    #[inline]
    pub fn set_frequency(&self, hz: f32) {
        self.frequency.store(hz);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude.load()
    }

    #[inline]
    pub fn set_amplitude(&self, amplitude: f32) {
        self.amplitude.store(amplitude);
    }

    /// Smoothed 0..1 indicator of the enabled flag.
    #[inline]
    pub fn activity_level(&self) -> f32 {
        self.activity.load()
    }

    #[inline]
    pub(crate) fn publish_activity(&self, level: f32) {
        self.activity.store(level);
    }
}

/// Cloneable view-layer handle to an engine's parameters.
///
/// Every setter is one atomic store: never blocks, never allocates, safe to
/// call at any rate from any non-audio thread.
#[derive(Clone, Debug)]
pub struct ParamHandle {
    shared: Arc<SharedParams>,
}

impl ParamHandle {
    pub(crate) fn new(shared: Arc<SharedParams>) -> Self {
        Self { shared }
    }

    pub fn set_frequency(&self, hz: f32) {
        self.shared.set_frequency(hz);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.set_enabled(enabled);
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        self.shared.set_amplitude(amplitude);
    }

    pub fn frequency(&self) -> f32 {
        self.shared.frequency()
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.is_enabled()
    }

    pub fn amplitude(&self) -> f32 {
        self.shared.amplitude()
    }

    pub fn activity_level(&self) -> f32 {
        self.shared.activity_level()
    }
}
