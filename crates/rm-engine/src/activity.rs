//! One-pole smoothing of the enabled flag for UI animation.
//!
//! Updated once per block on the audio thread. The decay for a block of `n`
//! samples is `exp(-n / (tau * sample_rate))`, cached for the last seen
//! block length so steady-state hosts pay for one `exp` per session.

/// Block-rate exponential follower toward 0.0 or 1.0.
#[derive(Clone, Debug)]
pub struct ActivitySmoother {
    level: f32,
    time_samples: f64,
    cached_frames: usize,
    cached_decay: f32,
}

impl ActivitySmoother {
    pub fn new(initial: f32) -> Self {
        Self {
            level: initial.clamp(0.0, 1.0),
            time_samples: 0.0,
            cached_frames: 0,
            cached_decay: 1.0,
        }
    }

    /// Set the time constant. A non-positive time snaps straight to the target.
    pub fn set_time(&mut self, time_ms: f32, sample_rate: f64) {
        self.time_samples = (f64::from(time_ms) * 0.001 * sample_rate).max(0.0);
        self.cached_frames = 0;
        self.cached_decay = 1.0;
    }

    /// Advance by `frames` samples toward `enabled`'s target and return the new level.
    #[inline]
    pub fn update(&mut self, enabled: bool, frames: usize) -> f32 {
        if frames == 0 {
            return self.level;
        }
        let target = if enabled { 1.0 } else { 0.0 };
        if self.time_samples <= 0.0 {
            self.level = target;
            return self.level;
        }
        if frames != self.cached_frames {
            self.cached_frames = frames;
            self.cached_decay = libm::exp(-(frames as f64) / self.time_samples) as f32;
        }
        self.level = (target + (self.level - target) * self.cached_decay).clamp(0.0, 1.0);
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_toward_one_when_enabled() {
        let mut s = ActivitySmoother::new(0.0);
        s.set_time(80.0, 48000.0);
        let mut prev = 0.0;
        for _ in 0..20 {
            let v = s.update(true, 480);
            assert!(v > prev && v <= 1.0);
            prev = v;
        }
    }

    #[test]
    fn one_time_constant_covers_63_percent() {
        let mut s = ActivitySmoother::new(1.0);
        s.set_time(10.0, 48000.0);
        // 10 ms at 48 kHz = 480 samples
        let v = s.update(false, 480);
        assert!((v - (-1.0f32).exp()).abs() < 1e-4, "got {}", v);
    }

    #[test]
    fn split_blocks_match_one_long_block() {
        let mut a = ActivitySmoother::new(0.0);
        let mut b = ActivitySmoother::new(0.0);
        a.set_time(50.0, 44100.0);
        b.set_time(50.0, 44100.0);
        let whole = a.update(true, 1024);
        let mut split = 0.0;
        for _ in 0..4 {
            split = b.update(true, 256);
        }
        assert!((whole - split).abs() < 1e-5);
    }

    #[test]
    fn zero_time_snaps() {
        let mut s = ActivitySmoother::new(0.0);
        s.set_time(0.0, 48000.0);
        assert_eq!(s.update(true, 1), 1.0);
        assert_eq!(s.update(false, 1), 0.0);
    }

    #[test]
    fn empty_block_is_ignored() {
        let mut s = ActivitySmoother::new(0.3);
        s.set_time(80.0, 48000.0);
        assert_eq!(s.update(true, 0), 0.3);
    }
}
