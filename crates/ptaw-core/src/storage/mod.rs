mod config;
pub mod presets;

pub use config::{Config, PresetsConfig, SoundsConfig, TimerConfig, DEFAULT_TICK_MS};
pub use presets::{HitCount, PhaseSnapshot, Preset, PresetStore};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns the data directory, creating it if needed.
///
/// `PTAW_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/ptaw[-dev]/`, with `PTAW_ENV=dev` selecting the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    if let Some(dir) = std::env::var_os("PTAW_DATA_DIR").filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PTAW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ptaw-dev")
    } else {
        base_dir.join("ptaw")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
