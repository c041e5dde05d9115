//! Named presets: per-phase duration bounds and colors plus a hit count range.
//!
//! Three presets ship built in and are written on first use:
//!
//! - **Default**: long Edging (2-4 min), 1-3 hits per cycle
//! - **Short and Hard**: currently identical to Default
//! - **Long Endurance**: Edging 5-10 min, fixed short phases, 2-4 hits
//!
//! # Example
//!
//! ```ignore
//! use ptaw_core::{Config, PresetStore, Sequencer};
//!
//! let config = Config::load()?;
//! let mut store = PresetStore::open(&config)?;
//! let mut sequencer = Sequencer::from_config(&config);
//! store.apply_to(&mut sequencer, "Long Endurance")?;
//! ```

mod builtin;
mod legacy;
mod store;
mod types;

pub use builtin::{builtin_presets, default_phases, DEFAULT_PRESET};
pub use store::PresetStore;
pub use types::{HitCount, PhaseSnapshot, Preset, Timings};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{RepeatRange, Sequencer};

    #[test]
    fn capture_then_apply_round_trips() {
        let presets = builtin_presets();
        let mut seq = Sequencer::with_seed(default_phases(), RepeatRange::default(), 9);

        presets["Long Endurance"].apply_to(&mut seq).unwrap();
        let captured = Preset::from_sequencer(&seq);
        assert_eq!(captured, presets["Long Endurance"]);
    }
}
