//! Preset store persistence against a real filesystem.

use std::collections::BTreeMap;

use proptest::prelude::*;
use ptaw_core::storage::presets::{builtin_presets, default_phases};
use ptaw_core::storage::{HitCount, PhaseSnapshot};
use ptaw_core::{
    Config, PresetError, Preset, PresetStore, RepeatRange, Rgba, Sequencer, PHASE_COUNT,
};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    }
}

fn arb_preset() -> impl Strategy<Value = Preset> {
    let phase = (0.0f64..1e6, 0.0f64..1e6, any::<[u8; 3]>()).prop_map(|(min, span, rgb)| {
        PhaseSnapshot {
            min,
            max: min + span,
            color: Rgba::opaque(rgb[0], rgb[1], rgb[2]),
        }
    });
    (
        proptest::collection::vec(phase, PHASE_COUNT),
        0u32..10,
        0u32..10,
    )
        .prop_map(|(phases, min, span)| Preset {
            phases,
            hit_count: HitCount {
                min,
                max: min + span,
            },
        })
}

#[test]
fn open_bootstraps_under_data_dir() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let store = PresetStore::open(&config).unwrap();
    assert_eq!(store.path(), dir.path().join("presets.json"));
    assert_eq!(store.presets(), &builtin_presets());
    assert!(store.path().exists());
}

#[test]
fn legacy_document_from_first_release_loads() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    std::fs::write(
        config.presets_path(),
        r##"{"Default": [[120, 240, "rgba(24, 40, 84,1)"], [10, 10, "rgba(34, 156, 23,1)"], [5, 15, "rgba(173, 5, 39,1)"], [10, 20, "rgba(81, 2, 156,1)"], [5, 5, "rgba(4, 51, 181,1)"], ["Hit count", 1, 3]],
            "Tinted": [[120, 240, "#ff0000"], [10, 10, "#00ff00"], [5, 15, "#0000ff"], [10, 20, "#ffffff"], [5, 5, "#000000"], ["Hit count", 2, 2]]}"##,
    )
    .unwrap();

    let store = PresetStore::open(&config).unwrap();
    assert_eq!(store.get("Default"), builtin_presets().get("Default"));
    let tinted = store.get("Tinted").unwrap();
    assert_eq!(tinted.phases[0].color, Rgba::opaque(255, 0, 0));
    assert_eq!(tinted.hit_count, HitCount { min: 2, max: 2 });
}

#[test]
fn malformed_entry_fails_on_apply_not_load() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    std::fs::write(
        config.presets_path(),
        r#"{"Short": {"phases": [{"min": 1, "max": 2, "color": "rgba(1, 2, 3, 1)"}], "hit_count": {"min": 1, "max": 1}}}"#,
    )
    .unwrap();

    let mut store = PresetStore::open(&config).unwrap();
    let mut seq = Sequencer::with_seed(default_phases(), RepeatRange::default(), 3);
    let before = seq.phases().clone();

    let err = store.apply_to(&mut seq, "Short").unwrap_err();
    assert!(matches!(
        err,
        PresetError::ShapeMismatch {
            expected: 5,
            actual: 1
        }
    ));
    assert_eq!(seq.phases(), &before);
    assert_eq!(store.current(), None);
}

#[test]
fn deleting_every_preset_leaves_empty_store() {
    let dir = TempDir::new().unwrap();
    let mut store = PresetStore::open(&config_in(&dir)).unwrap();
    let mut seq = Sequencer::with_seed(default_phases(), RepeatRange::default(), 3);
    store.apply_to(&mut seq, "Default").unwrap();

    let names: Vec<String> = store.names().map(String::from).collect();
    for name in names {
        store.delete(&name).unwrap();
    }

    assert!(store.is_empty());
    assert_eq!(store.current(), None);
    assert_eq!(store.initial_preset(Some("Default")), None);

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw.trim(), "{}");
}

#[test]
fn no_temp_files_left_behind() {
    let dir = TempDir::new().unwrap();
    let mut store = PresetStore::open(&config_in(&dir)).unwrap();
    let preset = store.get("Default").unwrap().clone();
    store.upsert("Again", preset).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["presets.json".to_string()]);
}

#[test]
fn config_load_from_writes_defaults_once() {
    let dir = TempDir::new().unwrap();

    let mut config = Config::load_from(dir.path()).unwrap();
    assert!(dir.path().join("config.toml").exists());
    assert_eq!(config.presets_path(), dir.path().join("presets.json"));

    config.set("timer.tick_ms", "25").unwrap();
    let reloaded = Config::load_from(dir.path()).unwrap();
    assert_eq!(reloaded.timer.tick_ms, 25);
    assert_eq!(reloaded.data_dir, dir.path());
}

#[test]
fn long_fractional_durations_reload_exactly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("presets.json");
    let mut preset = builtin_presets().remove("Default").unwrap();
    preset.phases[0].min = 0.0;
    preset.phases[0].max = 184.81810450340646;

    let mut store = PresetStore::new(&path);
    store.upsert("Precise", preset.clone()).unwrap();

    let mut reopened = PresetStore::new(&path);
    reopened.load().unwrap();
    assert_eq!(reopened.get("Precise"), Some(&preset));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn save_then_load_round_trips(
        presets in proptest::collection::btree_map("[A-Za-z]([A-Za-z ]{0,14}[A-Za-z])?", arb_preset(), 1..6)
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presets.json");

        let mut store = PresetStore::new(&path);
        for (name, preset) in &presets {
            store.upsert(name, preset.clone()).unwrap();
        }

        let mut reopened = PresetStore::new(&path);
        let loaded: BTreeMap<String, Preset> = reopened.load().unwrap().clone();
        prop_assert_eq!(loaded, presets);
    }
}
