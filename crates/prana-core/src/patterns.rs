//! Breathing pattern registry.
//!
//! A small set of built-in guided patterns; the full catalog lives in
//! the application layer, the engine only needs enough to resolve a
//! selection key and fall back sensibly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::phase::PhaseDurations;

/// Selection key reserved for the user-assembled pattern.
pub const CUSTOM_PATTERN_KEY: &str = "custom";

/// Preset used whenever a selection key cannot be resolved.
pub const DEFAULT_PATTERN_KEY: &str = "box";

/// How a breath is taken for one direction of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreathMethod {
    Nose,
    Mouth,
}

/// Which direction a method applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodKind {
    Inhale,
    Exhale,
}

/// Recommended breath methods for a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathMethods {
    pub inhale: BreathMethod,
    pub exhale: BreathMethod,
}

impl Default for BreathMethods {
    fn default() -> Self {
        Self {
            inhale: BreathMethod::Nose,
            exhale: BreathMethod::Nose,
        }
    }
}

impl BreathMethods {
    pub fn set(&mut self, kind: MethodKind, method: BreathMethod) {
        match kind {
            MethodKind::Inhale => self.inhale = method,
            MethodKind::Exhale => self.exhale = method,
        }
    }
}

/// A named breathing pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathPattern {
    /// Unique pattern identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Short description of what the pattern is for.
    pub description: String,
    /// Phase timings in milliseconds.
    pub phases: PhaseDurations,
    /// Recommended breath methods.
    pub methods: BreathMethods,
}

impl BreathPattern {
    /// Full cycle duration in milliseconds.
    pub fn cycle_ms(&self) -> f64 {
        self.phases.total()
    }

    /// Breaths per minute at the pattern's base timing.
    pub fn breaths_per_minute(&self) -> f64 {
        let total = self.cycle_ms();
        if total <= 0.0 {
            0.0
        } else {
            60_000.0 / total
        }
    }
}

fn pattern(
    id: &str,
    label: &str,
    description: &str,
    phases: PhaseDurations,
    methods: BreathMethods,
) -> BreathPattern {
    BreathPattern {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        phases,
        methods,
    }
}

/// All built-in breathing patterns, keyed by id.
pub fn builtin_patterns() -> HashMap<String, BreathPattern> {
    let nose = BreathMethods::default();
    let nose_mouth = BreathMethods {
        inhale: BreathMethod::Nose,
        exhale: BreathMethod::Mouth,
    };

    let mut patterns = HashMap::new();

    // Box breathing: the default, equal spans all around.
    patterns.insert(
        "box".to_string(),
        pattern(
            "box",
            "Focus",
            "Equal four-count phases to steady attention.",
            PhaseDurations::new(4000.0, 4000.0, 4000.0, 4000.0),
            nose,
        ),
    );

    // 4-7-8 (Andrew Weil technique)
    patterns.insert(
        "4-7-8".to_string(),
        pattern(
            "4-7-8",
            "Tranquility",
            "A natural tranquilizer for the nervous system.",
            PhaseDurations::new(4000.0, 7000.0, 8000.0, 0.0),
            nose_mouth,
        ),
    );

    patterns.insert(
        "calm".to_string(),
        pattern(
            "calm",
            "Balance",
            "Gentle extended exhale for everyday settling.",
            PhaseDurations::new(4000.0, 0.0, 6000.0, 0.0),
            nose,
        ),
    );

    // Coherence (HeartMath)
    patterns.insert(
        "coherence".to_string(),
        pattern(
            "coherence",
            "Coherence",
            "Even five-breaths-per-minute pacing for HRV.",
            PhaseDurations::new(6000.0, 0.0, 6000.0, 0.0),
            nose,
        ),
    );

    patterns.insert(
        "triangle".to_string(),
        pattern(
            "triangle",
            "Triangle",
            "Three equal sides with a free exhale.",
            PhaseDurations::new(4000.0, 4000.0, 4000.0, 0.0),
            nose,
        ),
    );

    patterns
}

/// Look up a built-in pattern, falling back to the default preset for
/// unrecognized keys.
pub fn resolve_builtin(key: &str) -> BreathPattern {
    let mut patterns = builtin_patterns();
    if let Some(p) = patterns.remove(key) {
        return p;
    }
    patterns
        .remove(DEFAULT_PATTERN_KEY)
        .expect("default pattern is always registered")
}
