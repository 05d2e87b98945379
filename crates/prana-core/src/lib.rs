//! Guided breathing engine: phase derivation, reactive session store,
//! and a frame-driven timer.
//!
//! The store is the state of record; the timer bridges an injected
//! frame driver to it, turning wall-clock timestamps into phase and
//! progress derivations. Rendering, audio, and persistence live in
//! collaborator crates and only touch the surfaces re-exported here.

pub mod driver;
pub mod patterns;
pub mod phase;
pub mod store;
pub mod timer;

#[cfg(test)]
mod tests_proptest;

pub use driver::{FrameCallback, FrameDriver, IntervalDriver, ManualDriver, StopHandle};
pub use patterns::{
    builtin_patterns, BreathMethod, BreathMethods, BreathPattern, MethodKind,
    CUSTOM_PATTERN_KEY, DEFAULT_PATTERN_KEY,
};
pub use phase::{phase_at, Phase, PhaseDurations, PhaseInfo, PhaseKey};
pub use store::{BreathingStore, MAX_PHASE_MS, MIN_CYCLE_MS};
pub use timer::{shared_store, BreathSnapshot, BreathingTimer, SharedStore, TimerCore};
