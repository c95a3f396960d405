//! Flush-to-zero scope for the audio callback.
//!
//! Multiplying a decaying input by a carrier near a zero crossing produces
//! subnormal floats, which are orders of magnitude slower on most CPUs.
//! While a guard is alive the current thread flushes them to zero.
//!
//! - x86-64: FTZ (bit 15) and DAZ (bit 6) in MXCSR
//! - aarch64: FZ (bit 24) in FPCR
//! - elsewhere: no-op

/// Restores the previous floating-point control state on drop.
pub struct DenormalGuard {
    #[cfg(target_arch = "x86_64")]
    previous_mxcsr: u32,
    #[cfg(target_arch = "aarch64")]
    previous_fpcr: u64,
}

impl DenormalGuard {
    #[cfg(target_arch = "x86_64")]
    const FLUSH_BITS: u32 = (1 << 15) | (1 << 6);
    #[cfg(target_arch = "aarch64")]
    const FLUSH_BITS: u64 = 1 << 24;

    #[inline]
    pub fn new() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            let previous_mxcsr = read_mxcsr();
            write_mxcsr(previous_mxcsr | Self::FLUSH_BITS);
            Self { previous_mxcsr }
        }
        #[cfg(target_arch = "aarch64")]
        {
            let previous_fpcr = read_fpcr();
            write_fpcr(previous_fpcr | Self::FLUSH_BITS);
            Self { previous_fpcr }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {}
        }
    }
}

impl Default for DenormalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DenormalGuard {
    #[inline]
    fn drop(&mut self) {
        #[cfg(target_arch = "x86_64")]
        write_mxcsr(self.previous_mxcsr);
        #[cfg(target_arch = "aarch64")]
        write_fpcr(self.previous_fpcr);
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_mxcsr() -> u32 {
    let mut mxcsr: u32 = 0;
    // SAFETY: stmxcsr only stores the thread's own control register.
    unsafe {
        core::arch::asm!("stmxcsr [{}]", in(reg) &mut mxcsr, options(nostack, preserves_flags));
    }
    mxcsr
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn write_mxcsr(mxcsr: u32) {
    // SAFETY: only rounding/flush mode bits change, and only for this thread.
    unsafe {
        core::arch::asm!("ldmxcsr [{}]", in(reg) &mxcsr, options(nostack, preserves_flags));
    }
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn read_fpcr() -> u64 {
    let fpcr: u64;
    // SAFETY: reading FPCR has no side effects.
    unsafe {
        core::arch::asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
    }
    fpcr
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn write_fpcr(fpcr: u64) {
    // SAFETY: only the flush-to-zero bit differs from the saved value.
    unsafe {
        core::arch::asm!("msr fpcr, {}", in(reg) fpcr, options(nomem, nostack, preserves_flags));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    fn subnormal_products_flush_inside_guard() {
        let tiny = std::hint::black_box(f32::MIN_POSITIVE);
        let half = std::hint::black_box(0.5f32);
        {
            let _guard = DenormalGuard::new();
            assert_eq!(std::hint::black_box(tiny * half), 0.0);
        }
        assert!(std::hint::black_box(tiny * half) > 0.0);
    }
}
