use std::collections::BTreeMap;

use super::types::{HitCount, PhaseSnapshot, Preset};
use crate::sequencer::{DurationRange, PhaseConfig, PhaseKind, Rgba, PHASE_COUNT};

/// Preset applied when nothing else is chosen.
pub const DEFAULT_PRESET: &str = "Default";

const COLORS: [Rgba; PHASE_COUNT] = [
    Rgba::opaque(24, 40, 84),
    Rgba::opaque(34, 156, 23),
    Rgba::opaque(173, 5, 39),
    Rgba::opaque(81, 2, 156),
    Rgba::opaque(4, 51, 181),
];

const DEFAULT_TIMINGS: [(f64, f64); PHASE_COUNT] =
    [(120.0, 240.0), (10.0, 10.0), (5.0, 15.0), (10.0, 20.0), (5.0, 5.0)];

const LONG_ENDURANCE_TIMINGS: [(f64, f64); PHASE_COUNT] =
    [(300.0, 600.0), (9.0, 9.0), (10.0, 10.0), (11.0, 11.0), (5.0, 5.0)];

// "Short and Hard" carries the Default values unchanged.
const BUILTINS: [(&str, [(f64, f64); PHASE_COUNT], HitCount); 3] = [
    (DEFAULT_PRESET, DEFAULT_TIMINGS, HitCount { min: 1, max: 3 }),
    ("Short and Hard", DEFAULT_TIMINGS, HitCount { min: 1, max: 3 }),
    ("Long Endurance", LONG_ENDURANCE_TIMINGS, HitCount { min: 2, max: 4 }),
];

/// Presets written to a fresh store.
pub fn builtin_presets() -> BTreeMap<String, Preset> {
    BUILTINS
        .iter()
        .map(|(name, timings, hit_count)| {
            let phases = timings
                .iter()
                .zip(COLORS)
                .map(|(&(min, max), color)| PhaseSnapshot { min, max, color })
                .collect();
            (
                name.to_string(),
                Preset {
                    phases,
                    hit_count: *hit_count,
                },
            )
        })
        .collect()
}

/// Phase list of the `Default` preset, without sound cues.
pub fn default_phases() -> [PhaseConfig; PHASE_COUNT] {
    PhaseKind::ALL.map(|kind| {
        let (min, max) = DEFAULT_TIMINGS[kind.index()];
        PhaseConfig::new(kind, DurationRange::from_trusted(min, max), COLORS[kind.index()])
    })
}
