//! Reader for preset documents written by the first desktop release.
//!
//! That format stores each preset as positional rows:
//!
//! ```text
//! "Default": [[120, 240, "rgba(24, 40, 84,1)"], ..., ["Hit count", 1, 3]]
//! ```
//!
//! Documents are only ever read in this shape; the store writes the keyed
//! schema.

use serde::Deserialize;

use super::types::{HitCount, PhaseSnapshot, Preset};
use crate::sequencer::Rgba;

const HIT_COUNT_SENTINEL: &str = "Hit count";

/// One preset entry as found on disk.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum StoredPreset {
    Keyed(Preset),
    Legacy(Vec<LegacyRow>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum LegacyRow {
    Phase(f64, f64, Rgba),
    HitCount(String, u32, u32),
}

impl StoredPreset {
    pub(super) fn into_preset(self) -> Result<Preset, String> {
        let rows = match self {
            StoredPreset::Keyed(preset) => return Ok(preset),
            StoredPreset::Legacy(rows) => rows,
        };

        let mut phases = Vec::with_capacity(rows.len());
        let mut hit_count = None;
        for row in rows {
            if hit_count.is_some() {
                return Err(format!("row after '{HIT_COUNT_SENTINEL}' entry"));
            }
            match row {
                LegacyRow::Phase(min, max, color) => phases.push(PhaseSnapshot { min, max, color }),
                LegacyRow::HitCount(label, min, max) if label == HIT_COUNT_SENTINEL => {
                    hit_count = Some(HitCount { min, max });
                }
                LegacyRow::HitCount(label, ..) => {
                    return Err(format!("unexpected row label '{label}'"));
                }
            }
        }

        let hit_count =
            hit_count.ok_or_else(|| format!("missing '{HIT_COUNT_SENTINEL}' entry"))?;
        Ok(Preset { phases, hit_count })
    }
}
