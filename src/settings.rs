use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::generator::DEFAULT_TITLE_COUNT;

pub const DATA_DIR_ENV: &str = "TITLEGEN_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub title_count: usize,
    /// Artificial wait before results appear, mirroring a network round trip.
    pub delay_ms: u64,
    pub collapse_spaces: bool,
    /// Fixed seed for reproducible output. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// How long a copied title keeps its "copied" marker.
    pub copied_reset_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: String,
}

fn default_data_dir_path() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if cfg!(target_os = "windows") {
        if let Some(base) = std::env::var_os("LOCALAPPDATA")
            .or_else(|| std::env::var_os("APPDATA"))
            .or_else(|| std::env::var_os("USERPROFILE"))
        {
            return PathBuf::from(base).join("titlegen");
        }
    }

    if cfg!(target_os = "macos") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("titlegen");
        }
    }

    if cfg!(target_os = "linux") {
        if let Some(dir) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(dir).join("titlegen");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("titlegen");
        }
    }

    std::env::temp_dir().join("titlegen")
}

fn default_data_dir() -> String {
    default_data_dir_path().to_string_lossy().to_string()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            title_count: DEFAULT_TITLE_COUNT,
            delay_ms: 800,
            collapse_spaces: false,
            seed: None,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            copied_reset_ms: 2_000,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            ui: UiSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}
