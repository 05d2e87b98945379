//! Frame driver injection.
//!
//! The timer never owns a clock: an external driver feeds it timestamps
//! through a single `start(callback) -> StopHandle` contract. Production
//! code wraps a wall-clock loop; tests step a manual driver by hand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Per-frame callback. Receives a timestamp in floating-point
/// milliseconds on an arbitrary but self-consistent clock.
pub type FrameCallback = Box<dyn FnMut(f64) + Send + 'static>;

/// Source of frame timestamps. `start` must invoke the callback
/// repeatedly until the returned handle is stopped; after `stop`
/// returns, no further invocations may occur.
pub trait FrameDriver {
    fn start(&self, callback: FrameCallback) -> StopHandle;
}

/// Handle that halts a running driver subscription. Stops on explicit
/// `stop()` or on drop, whichever comes first.
pub struct StopHandle {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl StopHandle {
    pub fn new(stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stop: Some(Box::new(stop)),
        }
    }

    pub fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for StopHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

/// Manually stepped driver for tests and demos. `step(ts)` invokes the
/// active callback synchronously; stopping drops the callback so later
/// steps are no-ops.
#[derive(Clone, Default)]
pub struct ManualDriver {
    callback: Arc<Mutex<Option<FrameCallback>>>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame timestamp to the subscribed callback, if any.
    pub fn step(&self, timestamp_ms: f64) {
        let mut slot = self.callback.lock();
        if let Some(callback) = slot.as_mut() {
            callback(timestamp_ms);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.callback.lock().is_some()
    }
}

impl FrameDriver for ManualDriver {
    fn start(&self, callback: FrameCallback) -> StopHandle {
        *self.callback.lock() = Some(callback);
        let slot = Arc::clone(&self.callback);
        StopHandle::new(move || {
            slot.lock().take();
        })
    }
}

/// Wall-clock driver: a background thread wakes at a fixed interval and
/// reports milliseconds elapsed since `start`.
pub struct IntervalDriver {
    interval: Duration,
}

impl IntervalDriver {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for IntervalDriver {
    /// Roughly display-frame cadence.
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

impl FrameDriver for IntervalDriver {
    fn start(&self, mut callback: FrameCallback) -> StopHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let interval = self.interval;
        let worker = thread::spawn(move || {
            let origin = Instant::now();
            while flag.load(Ordering::Relaxed) {
                callback(origin.elapsed().as_secs_f64() * 1000.0);
                thread::sleep(interval);
            }
        });
        // Joining guarantees no callback runs after stop() returns.
        StopHandle::new(move || {
            running.store(false, Ordering::Relaxed);
            let _ = worker.join();
        })
    }
}
