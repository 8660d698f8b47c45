use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

pub fn expand_tilde(path: &str) -> PathBuf {
    let stripped = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"));

    if let Some(stripped) = stripped {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
        if let Some(home) = home {
            return PathBuf::from(home).join(stripped);
        }
    }

    PathBuf::from(path)
}

pub fn data_dir(settings: &Settings) -> PathBuf {
    expand_tilde(&settings.storage.data_dir)
}

pub fn settings_path(settings: &Settings) -> PathBuf {
    data_dir(settings).join(SETTINGS_FILE)
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&raw).map_err(|err| err.to_string())
}

/// Where settings are read from. Always derived from the default data dir, never from a loaded
/// file's own `storage.data_dir`.
pub fn default_settings_path() -> PathBuf {
    settings_path(&Settings::default())
}

/// Loads settings from the default data dir, falling back to defaults on any failure.
pub fn load_settings() -> Settings {
    load_settings_from(&default_settings_path())
}

pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    match read_json::<Settings>(path) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("ignoring unreadable settings at {}: {err}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), String> {
    ensure_dir(path)?;
    let encoded = serde_json::to_string_pretty(settings).map_err(|err| err.to_string())?;
    fs::write(path, encoded).map_err(|err| err.to_string())
}

/// Rewrites the settings file at `path` with every key filled in, so it can be edited by hand.
pub fn init_config(path: &Path) -> Result<Settings, String> {
    let settings = load_settings_from(path);
    save_settings_to(path, &settings)?;
    Ok(settings)
}
