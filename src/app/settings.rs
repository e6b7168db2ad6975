use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{alerts::AlertConfig, insights::InsightSettings},
    storage::cache::CacheConfig,
};

const CONFIG_DIR_ENV: &str = "FORECASTIQ_CONFIG_DIR";
const SETTINGS_FILE: &str = "settings.json";
const STORE_FILE: &str = "store.json";

/// Every tunable threshold, grouped per component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub insights: InsightSettings,
    pub alerts: AlertConfig,
    pub cache: CacheConfig,
    /// Ring the terminal bell for alerts in addition to the toast line.
    /// Unset means undecided: only a manual demo alert asks.
    pub desktop_notifications: Option<bool>,
}

/// Loads settings from the config directory. Without disk access, or when the
/// file is missing or unreadable, defaults are returned.
pub fn load_settings(enable_disk: bool, dir: Option<&Path>) -> (Settings, Option<PathBuf>) {
    if !enable_disk {
        return (Settings::default(), None);
    }
    let Some(path) = settings_path(dir) else {
        return (Settings::default(), None);
    };
    (load_settings_from(&path), Some(path))
}

pub fn load_settings_from(path: &Path) -> Settings {
    let Ok(content) = fs::read_to_string(path) else {
        return Settings::default();
    };
    serde_json::from_str(&content).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "ignoring unreadable settings file");
        Settings::default()
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload =
        serde_json::to_string_pretty(settings).context("serializing settings payload failed")?;
    fs::write(path, payload).context("writing settings file failed")
}

/// `dir` overrides the config directory, e.g. from `--config-dir`.
pub fn settings_path(dir: Option<&Path>) -> Option<PathBuf> {
    config_dir(dir).map(|dir| dir.join(SETTINGS_FILE))
}

/// File backing the persistent key-value store (cache, events, searches).
pub fn store_path(dir: Option<&Path>) -> Option<PathBuf> {
    config_dir(dir).map(|dir| dir.join(STORE_FILE))
}

fn config_dir(dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = dir {
        return Some(dir.to_path_buf());
    }
    if let Some(base) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(base));
    }

    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join("forecastiq"))
}
