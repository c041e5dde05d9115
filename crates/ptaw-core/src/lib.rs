//! # PTAW Core Library
//!
//! Core logic for PTAW, a cyclic randomized interval timer. A standalone CLI
//! binary drives everything here; any GUI is a thin layer over the same
//! library.
//!
//! ## Architecture
//!
//! - **Sequencer**: tick-driven five-phase state machine (Edging, Prepare,
//!   Hit, Hold, Release) whose Release phase loops back to Hit until the
//!   cycle's randomly drawn hit target is reached
//! - **Events**: every presentation-visible change is returned as an
//!   [`Event`] for the UI layer to render
//! - **Storage**: JSON preset store and TOML configuration
//!
//! ## Key Components
//!
//! - [`Sequencer`]: Core state machine
//! - [`PresetStore`]: Named preset persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod sequencer;
pub mod storage;

pub use error::{ConfigError, CoreError, PresetError, ValidationError};
pub use events::{Event, EventSink};
pub use sequencer::{
    random_duration, DurationRange, PhaseConfig, PhaseKind, RepeatRange, Rgba, RunState,
    Sequencer, Snapshot, PHASE_COUNT,
};
pub use storage::{Config, Preset, PresetStore};
