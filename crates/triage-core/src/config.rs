use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::weights::Weights;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("unknown config key {0:?}")]
    UnknownKey(String),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// User configuration, loaded from `config.yaml` in the XDG config dir.
/// Every field has a default so a missing or partial file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Per-provider-call timeout in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default)]
    pub exclude_repos: Vec<String>,
    #[serde(default)]
    pub exclude_authors: Vec<String>,
    #[serde(default = "default_blocked_labels")]
    pub blocked_labels: Vec<String>,
    #[serde(default = "default_quick_win_labels")]
    pub quick_win_labels: Vec<String>,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub orphaned: OrphanedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            call_timeout_secs: default_call_timeout_secs(),
            exclude_repos: Vec::new(),
            exclude_authors: Vec::new(),
            blocked_labels: default_blocked_labels(),
            quick_win_labels: default_quick_win_labels(),
            weights: Weights::default(),
            orphaned: OrphanedConfig::default(),
        }
    }
}

fn default_format() -> String {
    "table".into()
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_blocked_labels() -> Vec<String> {
    vec!["blocked".into(), "waiting".into(), "on hold".into()]
}

fn default_quick_win_labels() -> Vec<String> {
    vec![
        "good first issue".into(),
        "help wanted".into(),
        "documentation".into(),
    ]
}

/// Repos to scan for orphaned external contributions, and the team-activity
/// staleness cutoff in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanedConfig {
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default = "default_stale_days")]
    pub stale_days: u32,
}

impl Default for OrphanedConfig {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            stale_days: default_stale_days(),
        }
    }
}

fn default_stale_days() -> u32 {
    14
}

impl Config {
    /// Load from the default path, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_file())
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(config_file())
    }

    pub fn save_to(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Set a value by dotted path (`orphaned.stale_days`,
    /// `weights.base_scores.mention`). The value is parsed as a YAML scalar,
    /// and the result must still deserialize into a valid `Config`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut root: serde_yaml::Value = serde_yaml::to_value(&*self).map_err(ConfigError::Parse)?;

        let mut node = &mut root;
        let segments: Vec<&str> = key.split('.').collect();
        for (i, segment) in segments.iter().enumerate() {
            let map = node
                .as_mapping_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let entry_key = serde_yaml::Value::String((*segment).to_string());
            if !map.contains_key(&entry_key) {
                return Err(ConfigError::UnknownKey(key.to_string()));
            }
            if i == segments.len() - 1 {
                let parsed: serde_yaml::Value = serde_yaml::from_str(value)?;
                map.insert(entry_key, parsed);
                break;
            }
            node = map
                .get_mut(&entry_key)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        *self = serde_yaml::from_value(root)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// UI preferences
// ---------------------------------------------------------------------------

/// Per-pane sort column and direction, saved on every change so the layout
/// survives restarts. Writes go back to the file it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiPreferences {
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(default)]
    pub panes: HashMap<String, PanePrefs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanePrefs {
    pub sort_column: String,
    pub sort_descending: bool,
}

impl UiPreferences {
    pub fn load() -> Self {
        Self::load_from(ui_preferences_file())
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut prefs: UiPreferences = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_yaml::from_str(&text).ok())
            .unwrap_or_default();
        prefs.path = Some(path);
        prefs
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(ui_preferences_file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("triage")
}

pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("triage")
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

pub fn ui_preferences_file() -> PathBuf {
    config_dir().join("ui_preferences.yaml")
}

pub fn resolved_file() -> PathBuf {
    cache_dir().join("resolved.json")
}

pub fn snapshots_file() -> PathBuf {
    cache_dir().join("snapshots.jsonl")
}
