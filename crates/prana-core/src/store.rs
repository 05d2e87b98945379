//! Authoritative session state for the breathing engine.
//!
//! The store owns playback and configuration state and recomputes its
//! derived values (`total_cycle_time`, `adjusted_phases`) synchronously
//! inside every mutation that can affect them, so readers never observe
//! stale derived state. No operation errors: numeric input is clamped
//! at entry and unknown pattern keys fall back to the default preset.

use serde::{Deserialize, Serialize};

use crate::patterns::{
    builtin_patterns, BreathMethod, BreathMethods, BreathPattern, MethodKind,
    CUSTOM_PATTERN_KEY, DEFAULT_PATTERN_KEY,
};
use crate::phase::{Phase, PhaseDurations, PhaseKey};

/// Shortest cycle the engine will run, ms.
pub const MIN_CYCLE_MS: f64 = 500.0;

/// Largest single phase duration accepted from the draft editor, ms.
pub const MAX_PHASE_MS: f64 = 10_000.0;

/// Clamp every phase duration into `[0, MAX_PHASE_MS]`. Applied at
/// each entry point that accepts a whole duration vector.
fn clamp_phases(phases: &mut PhaseDurations) {
    for key in PhaseKey::ORDER {
        phases.set(key, phases.get(key).clamp(0.0, MAX_PHASE_MS));
    }
}

/// Session state of record. Mutations go through the methods below;
/// the frame timer and UI-facing collaborators are the only callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingStore {
    // Playback (never persisted).
    is_playing: bool,
    current_phase: Phase,
    /// Elapsed time inside the current cycle, ms.
    current_time: f64,
    /// 1-based; the first cycle counts as in-progress from the start.
    cycle_count: u64,
    /// Total session time across pauses, ms.
    session_time: f64,

    // Configuration (persisted by the settings layer).
    selected_pattern: String,
    custom_pattern: Option<BreathPattern>,
    draft_phases: PhaseDurations,
    draft_methods: BreathMethods,
    /// Signed ms added to the base cycle total.
    speed_adjustment: f64,
    settings_saved: bool,

    // Derived, recomputed on every configuration mutation.
    total_cycle_time: f64,
    adjusted_phases: PhaseDurations,

    /// Bumped whenever derived values are recomputed; lets the timer
    /// refresh its local shadows without diffing every field.
    revision: u64,
}

impl Default for BreathingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingStore {
    pub fn new() -> Self {
        Self::with_pattern(DEFAULT_PATTERN_KEY)
    }

    pub fn with_pattern(key: &str) -> Self {
        let mut store = Self {
            is_playing: false,
            current_phase: Phase::Ready,
            current_time: 0.0,
            cycle_count: 1,
            session_time: 0.0,
            selected_pattern: String::new(),
            custom_pattern: None,
            draft_phases: PhaseDurations::default(),
            draft_methods: BreathMethods::default(),
            speed_adjustment: 0.0,
            settings_saved: true,
            total_cycle_time: 0.0,
            adjusted_phases: PhaseDurations::default(),
            revision: 0,
        };
        store.select_pattern(key);
        store
    }

    /// Rebuild a store from persisted configuration. Playback fields
    /// are never persisted and start at their initial values. Persisted
    /// numbers pass through the same clamps as live mutations, so a
    /// hand-edited settings file cannot produce an invalid cycle.
    pub fn restore(
        selected_pattern: String,
        mut custom_pattern: Option<BreathPattern>,
        mut draft_phases: PhaseDurations,
        draft_methods: BreathMethods,
        speed_adjustment: f64,
    ) -> Self {
        clamp_phases(&mut draft_phases);
        if let Some(pattern) = custom_pattern.as_mut() {
            clamp_phases(&mut pattern.phases);
        }
        let mut store = Self {
            is_playing: false,
            current_phase: Phase::Ready,
            current_time: 0.0,
            cycle_count: 1,
            session_time: 0.0,
            selected_pattern,
            custom_pattern,
            draft_phases,
            draft_methods,
            speed_adjustment,
            settings_saved: true,
            total_cycle_time: 0.0,
            adjusted_phases: PhaseDurations::default(),
            revision: 0,
        };
        store.recompute_derived();
        // re-apply the speed floor now that the base total is known
        store.adjust_cycle_speed(0.0);
        store
    }

    // --- read surface ---

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_phase(&self) -> Phase {
        self.current_phase
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn session_time(&self) -> f64 {
        self.session_time
    }

    pub fn selected_pattern(&self) -> &str {
        &self.selected_pattern
    }

    pub fn custom_pattern(&self) -> Option<&BreathPattern> {
        self.custom_pattern.as_ref()
    }

    pub fn draft_phases(&self) -> PhaseDurations {
        self.draft_phases
    }

    pub fn draft_methods(&self) -> BreathMethods {
        self.draft_methods
    }

    pub fn speed_adjustment(&self) -> f64 {
        self.speed_adjustment
    }

    pub fn settings_saved(&self) -> bool {
        self.settings_saved
    }

    pub fn total_cycle_time(&self) -> f64 {
        self.total_cycle_time
    }

    pub fn adjusted_phases(&self) -> PhaseDurations {
        self.adjusted_phases
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The pattern the engine is currently running: the stored custom
    /// pattern (or one synthesized from the drafts) when selection is
    /// `custom`, otherwise the named preset with default fallback.
    pub fn active_pattern(&self) -> BreathPattern {
        if self.selected_pattern == CUSTOM_PATTERN_KEY {
            if let Some(custom) = &self.custom_pattern {
                return custom.clone();
            }
            return self.pattern_from_drafts();
        }
        let mut patterns = builtin_patterns();
        match patterns.remove(self.selected_pattern.as_str()) {
            Some(p) => p,
            None => {
                log::warn!(
                    "unknown pattern key {:?}, falling back to {:?}",
                    self.selected_pattern,
                    DEFAULT_PATTERN_KEY
                );
                patterns
                    .remove(DEFAULT_PATTERN_KEY)
                    .expect("default pattern is always registered")
            }
        }
    }

    // --- playback ---

    /// Begin or resume playback. Resuming keeps the frozen position;
    /// only `reset` returns to the start of the cycle.
    pub fn play(&mut self) {
        self.is_playing = true;
        self.current_phase = self.first_active_phase();
    }

    /// Freeze playback in place. Nothing besides the flag changes.
    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Return all playback fields and the speed adjustment to their
    /// initial values. Pattern selection and drafts are untouched.
    pub fn reset(&mut self) {
        self.is_playing = false;
        self.current_phase = Phase::Ready;
        self.current_time = 0.0;
        self.cycle_count = 1;
        self.session_time = 0.0;
        self.speed_adjustment = 0.0;
        self.recompute_derived();
    }

    // --- timer-only mutations ---

    pub fn set_current_phase(&mut self, phase: Phase) {
        self.current_phase = phase;
    }

    pub fn set_current_time(&mut self, ms: f64) {
        self.current_time = ms;
    }

    /// Exactly one call per completed cycle; the timer unrolls
    /// multi-cycle ticks into repeated calls.
    pub fn increment_cycle(&mut self) {
        self.cycle_count += 1;
        log::debug!("cycle {} complete", self.cycle_count - 1);
    }

    /// Accumulate session time. Callers hand in non-negative deltas;
    /// anything else is treated as zero.
    pub fn update_session_time(&mut self, delta_ms: f64) {
        self.session_time += delta_ms.max(0.0);
    }

    // --- configuration ---

    /// Switch to a named preset: drafts follow the preset, the custom
    /// pattern and speed adjustment are cleared, settings count as
    /// saved.
    pub fn select_pattern(&mut self, key: &str) {
        let resolved = if key == CUSTOM_PATTERN_KEY {
            self.custom_pattern
                .clone()
                .unwrap_or_else(|| self.pattern_from_drafts())
        } else {
            let mut patterns = builtin_patterns();
            patterns
                .remove(key)
                .or_else(|| patterns.remove(DEFAULT_PATTERN_KEY))
                .expect("default pattern is always registered")
        };
        self.selected_pattern = key.to_string();
        self.draft_phases = resolved.phases;
        self.draft_methods = resolved.methods;
        if key != CUSTOM_PATTERN_KEY {
            self.custom_pattern = None;
        }
        self.speed_adjustment = 0.0;
        self.settings_saved = true;
        self.recompute_derived();
    }

    /// Install an externally assembled pattern and select it. Phase
    /// durations pass through the same clamp as the draft editor.
    pub fn set_custom_pattern(&mut self, mut pattern: BreathPattern) {
        clamp_phases(&mut pattern.phases);
        self.draft_phases = pattern.phases;
        self.draft_methods = pattern.methods;
        self.custom_pattern = Some(pattern);
        self.selected_pattern = CUSTOM_PATTERN_KEY.to_string();
        self.settings_saved = true;
        self.recompute_derived();
    }

    /// Edit one draft phase duration, clamped to `[0, MAX_PHASE_MS]`.
    /// Drafts only drive the live cycle while selection is `custom`.
    pub fn update_draft_phase(&mut self, key: PhaseKey, ms: f64) {
        self.draft_phases.set(key, ms.clamp(0.0, MAX_PHASE_MS));
        self.settings_saved = false;
        self.recompute_derived();
    }

    pub fn update_draft_method(&mut self, kind: MethodKind, method: BreathMethod) {
        self.draft_methods.set(kind, method);
        self.settings_saved = false;
    }

    /// Nudge one draft phase and make the change live by switching the
    /// selection to `custom`. A previously saved custom pattern would
    /// shadow the drafts, so it is dropped here; `save_settings`
    /// materializes the drafts again.
    pub fn adjust_phase(&mut self, key: PhaseKey, delta_ms: f64) {
        let next = (self.draft_phases.get(key) + delta_ms).clamp(0.0, MAX_PHASE_MS);
        self.draft_phases.set(key, next);
        self.custom_pattern = None;
        self.selected_pattern = CUSTOM_PATTERN_KEY.to_string();
        self.settings_saved = false;
        self.recompute_derived();
    }

    /// Materialize the current drafts as the saved "Custom" pattern and
    /// select it.
    pub fn save_settings(&mut self) {
        self.custom_pattern = Some(BreathPattern {
            id: CUSTOM_PATTERN_KEY.to_string(),
            label: "Custom".to_string(),
            description: "Your own pattern.".to_string(),
            phases: self.draft_phases,
            methods: self.draft_methods,
        });
        self.selected_pattern = CUSTOM_PATTERN_KEY.to_string();
        self.settings_saved = true;
        self.recompute_derived();
    }

    /// Stretch or compress the whole cycle by `delta_ms`, floored so
    /// the adjusted total never drops below `MIN_CYCLE_MS`.
    pub fn adjust_cycle_speed(&mut self, delta_ms: f64) {
        let base_total = self.active_pattern().phases.total();
        let floor = -(base_total - MIN_CYCLE_MS);
        self.speed_adjustment = (self.speed_adjustment + delta_ms).max(floor);
        self.recompute_derived();
    }

    // --- derivation ---

    /// Recompute `total_cycle_time` and `adjusted_phases` from the
    /// active pattern and the speed adjustment. Scaling is a single
    /// ratio applied to all four phases, so relative proportions are
    /// preserved. If the current cycle position has fallen out of
    /// range (the cycle shrank past it) it is re-clamped by modulo;
    /// growth preserves absolute position and lets the phase shift.
    fn recompute_derived(&mut self) {
        let base = self.active_pattern().phases;
        let base_total = base.total();
        let adjusted_total = (base_total + self.speed_adjustment).max(MIN_CYCLE_MS);
        let ratio = if base_total > 0.0 {
            adjusted_total / base_total
        } else {
            1.0
        };
        self.adjusted_phases = base.scaled(ratio);
        self.total_cycle_time = adjusted_total;
        if self.total_cycle_time > 0.0 && self.current_time >= self.total_cycle_time {
            self.current_time %= self.total_cycle_time;
        }
        self.revision = self.revision.wrapping_add(1);
    }

    fn pattern_from_drafts(&self) -> BreathPattern {
        BreathPattern {
            id: CUSTOM_PATTERN_KEY.to_string(),
            label: "Custom".to_string(),
            description: "Your own pattern.".to_string(),
            phases: self.draft_phases,
            methods: self.draft_methods,
        }
    }

    fn first_active_phase(&self) -> Phase {
        PhaseKey::ORDER
            .into_iter()
            .find(|key| self.adjusted_phases.get(*key) > 0.0)
            .map(PhaseKey::phase)
            .unwrap_or(Phase::Inhale)
    }
}
