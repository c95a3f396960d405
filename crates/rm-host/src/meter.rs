//! Periodic activity readout for a view layer.

use rm_engine::ParamHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Refresh rate of the on-screen indicator.
pub const METER_RATE_HZ: u32 = 60;

/// Polls an engine's activity level on its own thread and hands each reading
/// to a callback. Stops when dropped.
pub struct ActivityMeter {
    stop_signal: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ActivityMeter {
    pub fn spawn<F>(params: ParamHandle, rate_hz: u32, mut on_level: F) -> Self
    where
        F: FnMut(f32) + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = stop_signal.clone();
        let period = Duration::from_secs(1) / rate_hz.max(1);

        let thread = std::thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                on_level(params.activity_level());
                std::thread::sleep(period);
            }
        });

        Self { stop_signal, thread: Some(thread) }
    }

    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ActivityMeter {
    fn drop(&mut self) {
        self.stop();
    }
}
