//! TOML-based application configuration.
//!
//! Settings:
//! - Tick period and optional RNG seed
//! - Sound cue paths for Prepare, Hit, Hold and Release
//! - Preset document location and the preset applied at startup
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::sequencer::PhaseKind;

/// Default tick period of the run loop.
pub const DEFAULT_TICK_MS: u64 = 10;

const CONFIG_FILE: &str = "config.toml";
const PRESETS_FILE: &str = "presets.json";
const SOUNDS_DIR: &str = "sounds";

/// Timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Fixed seed for reproducible runs. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Sound cue configuration.
///
/// Relative paths resolve against `dir`, or `<data dir>/sounds` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_prepare_sound")]
    pub prepare: Option<PathBuf>,
    #[serde(default = "default_hit_sound")]
    pub hit: Option<PathBuf>,
    #[serde(default = "default_hold_sound")]
    pub hold: Option<PathBuf>,
    #[serde(default = "default_release_sound")]
    pub release: Option<PathBuf>,
}

/// Preset store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetsConfig {
    /// Preset document; relative paths resolve against the data directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Preset applied when a run starts without an explicit choice.
    #[serde(default = "default_preset_name")]
    pub default_preset: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sounds: SoundsConfig,
    #[serde(default)]
    pub presets: PresetsConfig,
    /// Directory this config was loaded from; relative paths resolve here.
    #[serde(skip)]
    pub data_dir: PathBuf,
}

// Default functions
fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}
fn default_true() -> bool {
    true
}
fn default_prepare_sound() -> Option<PathBuf> {
    Some(PathBuf::from("prepare.wav"))
}
fn default_hit_sound() -> Option<PathBuf> {
    Some(PathBuf::from("hit.wav"))
}
fn default_hold_sound() -> Option<PathBuf> {
    Some(PathBuf::from("hold.wav"))
}
fn default_release_sound() -> Option<PathBuf> {
    Some(PathBuf::from("release.wav"))
}
fn default_preset_name() -> String {
    super::presets::DEFAULT_PRESET.to_string()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
        }
    }
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            prepare: default_prepare_sound(),
            hit: default_hit_sound(),
            hold: default_hold_sound(),
            release: default_release_sound(),
        }
    }
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            file: None,
            default_preset: default_preset_name(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            sounds: SoundsConfig::default(),
            presets: PresetsConfig::default(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    // Cleared here; a required field then fails to deserialize.
                    serde_json::Value::Number(_) if value.is_empty() => serde_json::Value::Null,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    // Unset optional: infer the type from the text.
                    serde_json::Value::Null => {
                        if value.is_empty() {
                            serde_json::Value::Null
                        } else if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            serde_json::Value::String(value.into())
                        }
                    }
                    serde_json::Value::String(_) if value.is_empty() => serde_json::Value::Null,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf value".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Config file location inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    pub fn path(&self) -> PathBuf {
        Self::path_in(&self.data_dir)
    }

    /// Load from the default data directory, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unavailable, the file exists
    /// but cannot be parsed, or the default config cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&data_dir()?)
    }

    /// Load from `dir`, writing defaults there if no config file exists.
    pub fn load_from(dir: &Path) -> Result<Self, CoreError> {
        let path = Self::path_in(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let mut cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                cfg.data_dir = dir.to_path_buf();
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self {
                    data_dir: dir.to_path_buf(),
                    ..Self::default()
                };
                cfg.save()?;
                tracing::info!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = self.path();
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::create_dir_all(&self.data_dir).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and save. An empty value
    /// clears an optional setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let mut updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        if updated.timer.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "tick_ms must be at least 1".into(),
            }
            .into());
        }
        updated.data_dir = std::mem::take(&mut self.data_dir);
        *self = updated;
        self.save()
    }

    /// Resolved sound cue for a phase, or `None` if it has none or sounds
    /// are disabled. Edging never has a cue.
    pub fn sound_path(&self, kind: PhaseKind) -> Option<PathBuf> {
        if !self.sounds.enabled {
            return None;
        }
        let file = match kind {
            PhaseKind::Edging => None,
            PhaseKind::Prepare => self.sounds.prepare.as_ref(),
            PhaseKind::Hit => self.sounds.hit.as_ref(),
            PhaseKind::Hold => self.sounds.hold.as_ref(),
            PhaseKind::Release => self.sounds.release.as_ref(),
        }?;
        if file.is_absolute() {
            return Some(file.clone());
        }
        let base = match &self.sounds.dir {
            Some(dir) => self.resolve(dir),
            None => self.data_dir.join(SOUNDS_DIR),
        };
        Some(base.join(file))
    }

    /// Resolved preset document location.
    pub fn presets_path(&self) -> PathBuf {
        match &self.presets.file {
            Some(file) => self.resolve(file),
            None => self.data_dir.join(PRESETS_FILE),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}
