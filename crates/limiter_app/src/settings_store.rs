//! Settings persistence.
//!
//! Settings live in a small RON file next to the app. A missing or corrupt
//! file is never an error: the defaults apply and the next save rewrites it.

use std::fs;
use std::path::{Path, PathBuf};

use limiter_core::Settings;
use limiter_logging::{limiter_error, limiter_info, limiter_warn};
use serde::{Deserialize, Serialize};

const SETTINGS_FILENAME: &str = "limiter_settings.ron";

/// On-disk shape, kept separate from [`Settings`] so the core stays free of
/// serde and the file format can evolve independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PersistedSettings {
    enabled: bool,
    max_retained: u32,
    poll_interval_ms: u64,
}

impl From<Settings> for PersistedSettings {
    fn from(settings: Settings) -> Self {
        Self {
            enabled: settings.enabled,
            max_retained: settings.max_retained,
            poll_interval_ms: settings.poll_interval_ms,
        }
    }
}

impl From<PersistedSettings> for Settings {
    fn from(persisted: PersistedSettings) -> Self {
        Self {
            enabled: persisted.enabled,
            max_retained: persisted.max_retained,
            poll_interval_ms: persisted.poll_interval_ms,
        }
    }
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILENAME)
}

/// Loads settings from `dir`, falling back to defaults. The file may have
/// been edited by hand, so numeric fields are clamped back into bounds.
pub fn load(dir: &Path) -> Settings {
    let path = settings_path(dir);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            limiter_info!("No settings file at {:?}; using defaults", path);
            return Settings::default();
        }
        Err(err) => {
            limiter_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };

    match ron::from_str::<PersistedSettings>(&content) {
        Ok(persisted) => Settings::from(persisted).clamped(),
        Err(err) => {
            limiter_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}

/// Clamps and saves settings to `dir`, returning the values actually written.
pub fn save(dir: &Path, settings: Settings) -> Settings {
    let settings = settings.clamped();
    let persisted = PersistedSettings::from(settings);

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            limiter_error!("Failed to serialize settings: {}", err);
            return settings;
        }
    };

    let path = settings_path(dir);
    if let Err(err) = fs::write(&path, content) {
        limiter_error!("Failed to write settings to {:?}: {}", path, err);
    }
    settings
}
