//! Frame-driven breathing timer.
//!
//! `TimerCore` turns driver timestamps into store mutations: it owns the
//! per-tick arithmetic and a small shadow of the store's timing fields so
//! it only writes back values that actually changed. `BreathingTimer`
//! wraps it with the driver subscription lifecycle. The store stays the
//! single source of truth; everything the timer writes goes through the
//! store's mutation methods.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::driver::{FrameDriver, StopHandle};
use crate::phase::{phase_at, Phase, PhaseDurations};
use crate::store::BreathingStore;

/// Store handle shared between the timer callback and UI-facing callers.
pub type SharedStore = Arc<Mutex<BreathingStore>>;

pub fn shared_store(store: BreathingStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Per-tick state. Drives one store from a stream of frame timestamps;
/// robust against a source that stops, restarts, or runs backwards.
#[derive(Debug, Default)]
pub struct TimerCore {
    last_timestamp: Option<f64>,
    /// Local mirror of elapsed-in-cycle time; written back every tick.
    elapsed: f64,
    total: f64,
    phases: PhaseDurations,
    seen_revision: Option<u64>,
}

impl TimerCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last-seen timestamp so the next tick only anchors.
    /// Called when playback stops, otherwise the whole pause would be
    /// counted as one giant delta on resume.
    pub fn clear_anchor(&mut self) {
        self.last_timestamp = None;
    }

    /// Advance the store by one frame timestamp (float ms).
    pub fn on_frame(&mut self, timestamp_ms: f64, store: &mut BreathingStore) {
        if !store.is_playing() {
            self.last_timestamp = None;
            return;
        }
        self.sync_shadows(store);

        let Some(last) = self.last_timestamp else {
            // First tick after (re)start: anchor only, a delta against a
            // stale timestamp would jump the cycle forward.
            self.last_timestamp = Some(timestamp_ms);
            return;
        };
        // Never subtract time: a non-monotonic or duplicate timestamp
        // becomes a zero-delta tick.
        let delta = (timestamp_ms - last).max(0.0);
        self.last_timestamp = Some(timestamp_ms);

        if self.total <= 0.0 {
            return;
        }

        self.elapsed += delta;
        let mut completed = 0u64;
        while self.elapsed >= self.total {
            self.elapsed -= self.total;
            completed += 1;
        }
        if completed > 0 {
            // One increment per completed cycle; a single tick can span
            // several cycles when the driver was backgrounded.
            for _ in 0..completed {
                store.increment_cycle();
            }
            store.set_current_phase(Phase::Inhale);
        }

        store.update_session_time(delta);
        store.set_current_time(self.elapsed);

        let info = phase_at(self.elapsed, &self.phases);
        if info.phase != store.current_phase() {
            store.set_current_phase(info.phase);
        }
    }

    /// Refresh local mirrors when the store's derived values moved
    /// (live phase or speed adjustment). The store has already
    /// re-clamped `current_time` into range, so the mirror follows it.
    fn sync_shadows(&mut self, store: &BreathingStore) {
        let revision = store.revision();
        if self.seen_revision != Some(revision) {
            self.total = store.total_cycle_time();
            self.phases = store.adjusted_phases();
            self.elapsed = store.current_time();
            self.seen_revision = Some(revision);
        }
    }
}

/// Read model for visual and audio collaborators, recomputed from the
/// store on every capture, never cached across ticks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathSnapshot {
    pub phase: Phase,
    pub time_in_cycle: f64,
    /// Position within the whole cycle, clamped to [0, 1].
    pub cycle_progress: f64,
    /// Position within the current phase, clamped to [0, 1].
    pub phase_progress: f64,
    pub phase_elapsed: f64,
    pub phase_duration: f64,
    pub phase_remaining: f64,
    pub is_playing: bool,
    pub cycle_count: u64,
    pub session_time: f64,
}

impl BreathSnapshot {
    pub fn capture(store: &BreathingStore) -> Self {
        let total = store.total_cycle_time();
        let time = store.current_time();
        let info = phase_at(time, &store.adjusted_phases());
        let cycle_progress = if total > 0.0 {
            (time / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let phase_progress = if info.duration > 0.0 {
            (info.elapsed / info.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            phase: store.current_phase(),
            time_in_cycle: time,
            cycle_progress,
            phase_progress,
            phase_elapsed: info.elapsed,
            phase_duration: info.duration,
            phase_remaining: (info.duration - info.elapsed).max(0.0),
            is_playing: store.is_playing(),
            cycle_count: store.cycle_count(),
            session_time: store.session_time(),
        }
    }
}

/// Ties a store, a tick core, and a frame driver together. Subscribes
/// to the driver exactly when play begins and unsubscribes on pause,
/// reset, or drop, so no callback ever outlives playback.
pub struct BreathingTimer<D: FrameDriver> {
    store: SharedStore,
    core: Arc<Mutex<TimerCore>>,
    driver: D,
    handle: Option<StopHandle>,
}

impl<D: FrameDriver> BreathingTimer<D> {
    pub fn new(store: SharedStore, driver: D) -> Self {
        Self {
            store,
            core: Arc::new(Mutex::new(TimerCore::new())),
            driver,
            handle: None,
        }
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn is_subscribed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn snapshot(&self) -> BreathSnapshot {
        BreathSnapshot::capture(&self.store.lock())
    }

    /// Start or resume playback and subscribe to the driver.
    pub fn play(&mut self) {
        self.store.lock().play();
        if self.handle.is_none() {
            let store = Arc::clone(&self.store);
            let core = Arc::clone(&self.core);
            self.handle = Some(self.driver.start(Box::new(move |ts| {
                let mut store = store.lock();
                core.lock().on_frame(ts, &mut store);
            })));
        }
    }

    /// Freeze playback and drop the driver subscription.
    pub fn pause(&mut self) {
        self.store.lock().pause();
        self.core.lock().clear_anchor();
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }

    /// Return the session to its idle starting state.
    pub fn reset(&mut self) {
        self.store.lock().reset();
        self.core.lock().clear_anchor();
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}
