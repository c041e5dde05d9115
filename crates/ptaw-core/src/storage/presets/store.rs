//! Persistent named preset store.
//!
//! One JSON document maps preset names to presets. Writes go to a temporary
//! file in the same directory which is then renamed over the document, so a
//! reader never observes a half-written file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::builtin::{builtin_presets, DEFAULT_PRESET};
use super::legacy::StoredPreset;
use super::types::Preset;
use crate::error::{PresetError, ValidationError};
use crate::sequencer::Sequencer;
use crate::storage::Config;

/// Named presets backed by a JSON document.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
    presets: BTreeMap<String, Preset>,
    /// Name of the preset most recently applied through this store.
    current: Option<String>,
}

impl PresetStore {
    /// Create an empty, unloaded store for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            presets: BTreeMap::new(),
            current: None,
        }
    }

    /// Open and load the store configured in `config`.
    pub fn open(config: &Config) -> Result<Self, PresetError> {
        let mut store = Self::new(config.presets_path());
        store.load()?;
        Ok(store)
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Read the document, seeding built-in presets if it is missing or empty.
    ///
    /// # Errors
    ///
    /// `StoreCorrupt` if the document exists but is not a preset mapping; the
    /// in-memory store and the file are left untouched in that case.
    pub fn load(&mut self) -> Result<&BTreeMap<String, Preset>, PresetError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no preset store, writing built-ins");
                return self.bootstrap();
            }
            Err(e) => return Err(PresetError::Io(e)),
        };

        let presets = parse_document(&content).map_err(|message| {
            tracing::warn!(path = %self.path.display(), %message, "preset store is corrupt");
            PresetError::StoreCorrupt {
                path: self.path.clone(),
                message,
            }
        })?;

        if presets.is_empty() {
            tracing::info!(path = %self.path.display(), "preset store is empty, writing built-ins");
            return self.bootstrap();
        }

        tracing::debug!(count = presets.len(), "loaded presets");
        self.presets = presets;
        self.forget_missing_current();
        Ok(&self.presets)
    }

    fn bootstrap(&mut self) -> Result<&BTreeMap<String, Preset>, PresetError> {
        if let Some(dir) = self.parent_dir() {
            std::fs::create_dir_all(dir)?;
        }
        self.presets = builtin_presets();
        self.current = None;
        self.save()?;
        Ok(&self.presets)
    }

    /// Write every preset, replacing the document atomically.
    pub fn save(&self) -> Result<(), PresetError> {
        let write_failed = |source: std::io::Error| PresetError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(&self.presets)
            .map_err(|e| write_failed(std::io::Error::other(e)))?;

        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(write_failed)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
        tmp.write_all(content.as_bytes()).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(&self.path).map_err(|e| write_failed(e.error))?;

        tracing::debug!(path = %self.path.display(), count = self.presets.len(), "saved presets");
        Ok(())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert or overwrite `name` and save. Returns `true` if an existing
    /// preset was replaced. Overwrite confirmation is the caller's job; see
    /// [`PresetStore::contains`].
    ///
    /// # Errors
    ///
    /// Validation errors leave the store untouched. If the write fails the
    /// previous in-memory value is restored.
    pub fn upsert(&mut self, name: &str, preset: Preset) -> Result<bool, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "preset name must not be empty".into(),
            }
            .into());
        }
        preset.validate()?;

        let previous = self.presets.insert(name.to_string(), preset);
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.presets.insert(name.to_string(), old),
                None => self.presets.remove(name),
            };
            return Err(e);
        }

        tracing::info!(name, replaced = previous.is_some(), "preset saved");
        Ok(previous.is_some())
    }

    /// Remove `name` and save. Deleting the last preset is allowed and leaves
    /// an empty store with no current preset.
    ///
    /// # Errors
    ///
    /// `NotFound` if no preset has this name.
    pub fn delete(&mut self, name: &str) -> Result<Preset, PresetError> {
        let removed = self
            .presets
            .remove(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;

        if let Err(e) = self.save() {
            self.presets.insert(name.to_string(), removed);
            return Err(e);
        }

        self.forget_missing_current();
        tracing::info!(name, remaining = self.presets.len(), "preset deleted");
        Ok(removed)
    }

    /// Apply the named preset to `sequencer` and make it current.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ShapeMismatch` or a validation error. On any error the
    /// sequencer is unchanged.
    pub fn apply_to(&mut self, sequencer: &mut Sequencer, name: &str) -> Result<(), PresetError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        preset.apply_to(sequencer)?;
        self.current = Some(name.to_string());
        tracing::debug!(name, "preset applied");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn presets(&self) -> &BTreeMap<String, Preset> {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Name of the preset last applied, if it still exists.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Preset to apply at startup: `preferred` if present, else `Default`,
    /// else the first name. `None` only for an empty store.
    pub fn initial_preset(&self, preferred: Option<&str>) -> Option<&str> {
        preferred
            .and_then(|name| self.presets.get_key_value(name))
            .or_else(|| self.presets.get_key_value(DEFAULT_PRESET))
            .or_else(|| self.presets.iter().next())
            .map(|(name, _)| name.as_str())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn forget_missing_current(&mut self) {
        if let Some(name) = &self.current {
            if !self.presets.contains_key(name) {
                self.current = None;
            }
        }
    }
}

/// Parse a document in either the keyed or the legacy positional shape.
fn parse_document(content: &str) -> Result<BTreeMap<String, Preset>, String> {
    let stored: BTreeMap<String, StoredPreset> =
        serde_json::from_str(content).map_err(|e| e.to_string())?;
    stored
        .into_iter()
        .map(|(name, entry)| {
            entry
                .into_preset()
                .map(|preset| (name.clone(), preset))
                .map_err(|message| format!("preset '{name}': {message}"))
        })
        .collect()
}
