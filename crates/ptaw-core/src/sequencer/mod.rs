mod engine;
mod phase;

pub use engine::{RunState, Sequencer, Snapshot};
pub use phase::{
    random_duration, DurationRange, PhaseConfig, PhaseKind, RepeatRange, Rgba, MAX_DURATION_SECS,
    PHASE_COUNT,
};
