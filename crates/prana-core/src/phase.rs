//! Breath phases and stateless phase derivation.
//!
//! Elapsed-time-in-cycle plus a duration vector fully determine the
//! current phase; there is no per-phase state to keep in sync.

use serde::{Deserialize, Serialize};

/// Stage of a breathing cycle. `Ready` is the pre-session idle state;
/// the other four cycle in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Ready,
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

/// Keys for the four cyclic phases, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKey {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl PhaseKey {
    pub const ORDER: [PhaseKey; 4] = [
        PhaseKey::Inhale,
        PhaseKey::HoldIn,
        PhaseKey::Exhale,
        PhaseKey::HoldOut,
    ];

    pub fn phase(self) -> Phase {
        match self {
            PhaseKey::Inhale => Phase::Inhale,
            PhaseKey::HoldIn => Phase::HoldIn,
            PhaseKey::Exhale => Phase::Exhale,
            PhaseKey::HoldOut => Phase::HoldOut,
        }
    }
}

/// Per-phase durations in milliseconds. Durations are non-negative;
/// a zero duration means the phase is skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    pub inhale: f64,
    pub hold_in: f64,
    pub exhale: f64,
    pub hold_out: f64,
}

impl PhaseDurations {
    pub fn new(inhale: f64, hold_in: f64, exhale: f64, hold_out: f64) -> Self {
        Self {
            inhale,
            hold_in,
            exhale,
            hold_out,
        }
    }

    pub fn total(&self) -> f64 {
        self.inhale + self.hold_in + self.exhale + self.hold_out
    }

    pub fn get(&self, key: PhaseKey) -> f64 {
        match key {
            PhaseKey::Inhale => self.inhale,
            PhaseKey::HoldIn => self.hold_in,
            PhaseKey::Exhale => self.exhale,
            PhaseKey::HoldOut => self.hold_out,
        }
    }

    pub fn set(&mut self, key: PhaseKey, value: f64) {
        match key {
            PhaseKey::Inhale => self.inhale = value,
            PhaseKey::HoldIn => self.hold_in = value,
            PhaseKey::Exhale => self.exhale = value,
            PhaseKey::HoldOut => self.hold_out = value,
        }
    }

    /// Uniformly scale every phase by `ratio`, flooring at zero.
    pub fn scaled(&self, ratio: f64) -> Self {
        Self {
            inhale: (self.inhale * ratio).max(0.0),
            hold_in: (self.hold_in * ratio).max(0.0),
            exhale: (self.exhale * ratio).max(0.0),
            hold_out: (self.hold_out * ratio).max(0.0),
        }
    }
}

/// Result of deriving the active phase from elapsed-in-cycle time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseInfo {
    pub phase: Phase,
    /// Time already spent inside the phase, ms.
    pub elapsed: f64,
    /// Full duration of the phase, ms.
    pub duration: f64,
}

/// Derive the phase containing `time` ms of elapsed cycle time.
///
/// Walks the fixed phase order, skipping zero-duration phases. If the
/// cursor exhausts all phases (only possible when `time` is at or past
/// the cycle total) the result falls back to `Inhale` with a duration
/// floor of 1 ms so progress ratios stay well defined.
pub fn phase_at(time: f64, durations: &PhaseDurations) -> PhaseInfo {
    let mut cursor = time;
    for key in PhaseKey::ORDER {
        let duration = durations.get(key);
        if duration <= 0.0 {
            continue;
        }
        if cursor < duration {
            return PhaseInfo {
                phase: key.phase(),
                elapsed: cursor,
                duration,
            };
        }
        cursor -= duration;
    }
    PhaseInfo {
        phase: Phase::Inhale,
        elapsed: 0.0,
        duration: durations.inhale.max(1.0),
    }
}
