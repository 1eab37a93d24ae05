//! Keybinder configuration
//!
//! Stored in `~/.config/keybinder/config.yaml`. Every field has a default, so
//! an absent file or a partial file both work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KeybinderError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybinderConfig {
    pub defaults: DefaultsConfig,
    pub scan: ScanConfig,
    pub baseline: BaselineConfig,
    pub output: OutputConfig,
}

/// Fallback values for blank keybind fields
///
/// Merge runs first and fills in the target map, so `export_map` only
/// applies to keybinds exported without a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Target map for keybinds merged without one
    pub merge_map: String,
    /// UI group for exported keybinds without an owning mod
    pub ui_group: String,
    /// Target map for keybinds exported without one
    pub export_map: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            merge_map: "movement".to_string(),
            ui_group: "unknown".to_string(),
            export_map: "open_menu".to_string(),
        }
    }
}

/// Mod directory conventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directories starting with this (any case) hold generated output
    pub reserved_prefix: String,
    pub manifest_file: String,
    pub data_dir: String,
    pub archive_extension: String,
    pub script_extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: "zz".to_string(),
            manifest_file: "mod.manifest".to_string(),
            data_dir: "Data".to_string(),
            archive_extension: "pak".to_string(),
            script_extension: "lua".to_string(),
        }
    }
}

/// Where the vanilla profile documents come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Archive file name inside the game data directory
    pub archive: String,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            archive: "IPL_GameData.pak".to_string(),
        }
    }
}

/// Where the merged documents go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Generated mod directory created under the mods root
    pub dir_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_name: "zz_keybinder".to_string(),
        }
    }
}

impl KeybinderConfig {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, KeybinderError> {
        let content = std::fs::read_to_string(path).map_err(|e| KeybinderError::io(path, e))?;
        Self::parse(&content).map_err(|e| match e {
            KeybinderError::Config(msg) => {
                KeybinderError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn parse(yaml: &str) -> Result<Self, KeybinderError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| KeybinderError::Config(e.to_string()))
    }
}
