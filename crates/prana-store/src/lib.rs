//! Settings persistence for the breathing engine.
//!
//! Exactly the configuration fields survive a restart: pattern
//! selection, the saved custom pattern, phase/method drafts, and the
//! speed adjustment. Playback state never does. The file format is a
//! small TOML document; a missing or unparsable file falls back to
//! defaults rather than failing the session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prana_core::{BreathMethods, BreathPattern, BreathingStore, PhaseDurations};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// The configuration slice of a [`BreathingStore`] that survives a
/// process restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSettings {
    pub selected_pattern: String,
    pub speed_adjustment: f64,
    pub draft_phases: PhaseDurations,
    pub draft_methods: BreathMethods,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_pattern: Option<BreathPattern>,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self::capture(&BreathingStore::new())
    }
}

impl PersistedSettings {
    /// Snapshot the persistable fields of a live store.
    pub fn capture(store: &BreathingStore) -> Self {
        Self {
            selected_pattern: store.selected_pattern().to_string(),
            speed_adjustment: store.speed_adjustment(),
            draft_phases: store.draft_phases(),
            draft_methods: store.draft_methods(),
            custom_pattern: store.custom_pattern().cloned(),
        }
    }

    /// Build a fresh store from these settings. Playback starts idle.
    pub fn into_store(self) -> BreathingStore {
        BreathingStore::restore(
            self.selected_pattern,
            self.custom_pattern,
            self.draft_phases,
            self.draft_methods,
            self.speed_adjustment,
        )
    }
}

/// File-backed settings storage.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted settings. A missing file or one that no longer
    /// parses yields the defaults; only real I/O failures surface.
    pub fn load(&self) -> Result<PersistedSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(PersistedSettings::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&contents).unwrap_or_default())
    }

    /// Load settings and hydrate a store from them.
    pub fn load_store(&self) -> Result<BreathingStore, SettingsError> {
        Ok(self.load()?.into_store())
    }

    /// Persist the configuration slice of `store`.
    pub fn save(&self, store: &BreathingStore) -> Result<(), SettingsError> {
        self.save_settings(&PersistedSettings::capture(store))
    }

    pub fn save_settings(&self, settings: &PersistedSettings) -> Result<(), SettingsError> {
        let serialized = toml::to_string_pretty(settings)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}
