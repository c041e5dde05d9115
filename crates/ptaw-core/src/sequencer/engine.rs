//! Phase sequencer implementation.
//!
//! The sequencer is a tick-driven state machine. It owns no thread and no
//! clock: the caller invokes `tick()` periodically with the elapsed time.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle
//!
//! Edging -> Prepare -> Hit -> Hold -> Release -+-> Edging
//!                      ^                       |
//!                      +--- progress < target -+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut seq = Sequencer::new(phases, repeat_range);
//! let events = seq.start();
//! // In a loop:
//! let events = seq.tick(10);
//! ```

use std::path::PathBuf;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::phase::{DurationRange, PhaseConfig, PhaseKind, RepeatRange, Rgba, PHASE_COUNT};
use crate::events::Event;
use crate::storage::presets::default_phases;
use crate::storage::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
}

/// Point-in-time view of the sequencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: RunState,
    pub phase_index: usize,
    pub phase: PhaseKind,
    pub phase_name: String,
    pub hit_target: u32,
    pub repeat_progress: u32,
    pub remaining_ms: u64,
    pub total_ms: u64,
    pub total_hits: u64,
}

/// The five-phase sequencer.
#[derive(Debug, Clone)]
pub struct Sequencer {
    phases: [PhaseConfig; PHASE_COUNT],
    repeat_range: RepeatRange,
    state: RunState,
    phase_index: usize,
    hit_target: u32,
    repeat_progress: u32,
    /// Remaining time in milliseconds for the current phase.
    remaining_ms: u64,
    /// Drawn length of the current phase.
    total_ms: u64,
    /// Lifetime hit counter; never reset.
    total_hits: u64,
    last_countdown_secs: Option<u64>,
    rng: Mcg128Xsl64,
}

impl Sequencer {
    /// Create an idle sequencer seeded from OS entropy.
    pub fn new(phases: [PhaseConfig; PHASE_COUNT], repeat_range: RepeatRange) -> Self {
        Self::with_rng(phases, repeat_range, Mcg128Xsl64::from_entropy())
    }

    /// Create an idle sequencer with a reproducible random stream.
    pub fn with_seed(
        phases: [PhaseConfig; PHASE_COUNT],
        repeat_range: RepeatRange,
        seed: u64,
    ) -> Self {
        Self::with_rng(phases, repeat_range, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(
        phases: [PhaseConfig; PHASE_COUNT],
        repeat_range: RepeatRange,
        rng: Mcg128Xsl64,
    ) -> Self {
        Self {
            phases,
            repeat_range,
            state: RunState::Idle,
            phase_index: 0,
            hit_target: 0,
            repeat_progress: 0,
            remaining_ms: 0,
            total_ms: 0,
            total_hits: 0,
            last_countdown_secs: None,
            rng,
        }
    }

    /// Build from configuration: built-in `Default` timings, sound cues and
    /// seed taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        let phases = default_phases().map(|phase| {
            let sound = config.sound_path(phase.kind);
            phase.with_sound(sound)
        });
        match config.timer.seed {
            Some(seed) => Self::with_seed(phases, RepeatRange::default(), seed),
            None => Self::new(phases, RepeatRange::default()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn current_phase(&self) -> &PhaseConfig {
        &self.phases[self.phase_index]
    }

    pub fn phases(&self) -> &[PhaseConfig; PHASE_COUNT] {
        &self.phases
    }

    pub fn phase(&self, kind: PhaseKind) -> &PhaseConfig {
        &self.phases[kind.index()]
    }

    pub fn repeat_range(&self) -> RepeatRange {
        self.repeat_range
    }

    pub fn hit_target(&self) -> u32 {
        self.hit_target
    }

    pub fn repeat_progress(&self) -> u32 {
        self.repeat_progress
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn step_progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.total_ms as f64)
    }

    pub fn snapshot(&self) -> Snapshot {
        let phase = self.current_phase();
        Snapshot {
            state: self.state,
            phase_index: self.phase_index,
            phase: phase.kind,
            phase_name: phase.name.clone(),
            hit_target: self.hit_target,
            repeat_progress: self.repeat_progress,
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms,
            total_hits: self.total_hits,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the cycle at Edging. No-op while already running.
    pub fn start(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state == RunState::Running {
            return events;
        }
        self.state = RunState::Running;
        self.phase_index = PhaseKind::Edging.index();
        self.repeat_progress = 0;
        self.enter_phase(&mut events);
        events
    }

    /// Return to Idle. Emits `SequenceStopped` once; no-op while idle.
    pub fn stop(&mut self) -> Vec<Event> {
        if self.state == RunState::Idle {
            return Vec::new();
        }
        self.state = RunState::Idle;
        self.phase_index = 0;
        self.hit_target = 0;
        self.repeat_progress = 0;
        self.remaining_ms = 0;
        self.total_ms = 0;
        self.last_countdown_secs = None;
        tracing::debug!(total_hits = self.total_hits, "sequence stopped");
        vec![Event::SequenceStopped]
    }

    /// Advance the countdown by `elapsed_ms`. At most one phase transition
    /// happens per call; leftover time is not carried into the next phase.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != RunState::Running {
            return events;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms > 0 {
            self.push_countdown(&mut events);
            return events;
        }

        let finished = self.current_phase().kind;
        let next = self.complete_phase(finished, &mut events);
        self.phase_index = next.index();
        self.enter_phase(&mut events);
        events
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Replace duration bounds and color of one phase. Takes effect the
    /// next time that phase is entered.
    pub fn set_phase(&mut self, kind: PhaseKind, range: DurationRange, color: Rgba) {
        let phase = &mut self.phases[kind.index()];
        phase.range = range;
        phase.color = color;
    }

    pub fn set_sound(&mut self, kind: PhaseKind, sound: Option<PathBuf>) {
        self.phases[kind.index()].sound = sound;
    }

    pub fn set_repeat_range(&mut self, range: RepeatRange) {
        self.repeat_range = range;
    }

    /// Replace all phase timings and the repeat range at once.
    pub fn apply_timings(
        &mut self,
        timings: [(DurationRange, Rgba); PHASE_COUNT],
        repeat_range: RepeatRange,
    ) {
        for (kind, (range, color)) in PhaseKind::ALL.into_iter().zip(timings) {
            self.set_phase(kind, range, color);
        }
        self.repeat_range = repeat_range;
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Run the completion handler of `finished` and pick the next phase.
    fn complete_phase(&mut self, finished: PhaseKind, events: &mut Vec<Event>) -> PhaseKind {
        let name = self.phases[finished.index()].name.clone();
        match finished {
            PhaseKind::Edging => finished.next(),
            PhaseKind::Prepare => {
                self.hit_target = self.repeat_range.sample(&mut self.rng);
                self.repeat_progress = 0;
                tracing::debug!(hit_target = self.hit_target, "hit target drawn");
                events.push(status(format!("{name} – {} hit", self.hit_target)));
                finished.next()
            }
            PhaseKind::Hit => {
                self.repeat_progress += 1;
                self.total_hits += 1;
                events.push(status(self.progress_text(&name)));
                events.push(Event::HitCounterChanged {
                    total_hits: self.total_hits,
                });
                finished.next()
            }
            PhaseKind::Hold => {
                events.push(status(self.progress_text(&name)));
                finished.next()
            }
            PhaseKind::Release => {
                if self.repeat_progress < self.hit_target {
                    events.push(status(self.progress_text(&name)));
                    PhaseKind::Hit
                } else {
                    self.repeat_progress = 0;
                    events.push(status(name));
                    PhaseKind::Edging
                }
            }
        }
    }

    fn progress_text(&self, name: &str) -> String {
        format!("{name} – {} of {}", self.repeat_progress, self.hit_target)
    }

    /// Draw a duration for the current phase and emit its side effects.
    fn enter_phase(&mut self, events: &mut Vec<Event>) {
        let secs = self.phases[self.phase_index].draw(&mut self.rng);
        let phase = &self.phases[self.phase_index];
        self.total_ms = secs_to_ms(secs);
        self.remaining_ms = self.total_ms;
        self.last_countdown_secs = None;

        tracing::debug!(
            phase = %phase.kind,
            duration_ms = self.total_ms,
            "switching phase"
        );

        events.push(Event::PhaseChanged {
            name: phase.name.clone(),
            color: phase.color,
        });
        if let Some(path) = &phase.sound {
            events.push(Event::PlaySound { path: path.clone() });
        }
        self.push_countdown(events);
    }

    fn push_countdown(&mut self, events: &mut Vec<Event>) {
        let secs = self.remaining_ms.div_ceil(1000);
        if self.last_countdown_secs != Some(secs) {
            self.last_countdown_secs = Some(secs);
            events.push(Event::CountdownTick {
                seconds_remaining: secs,
            });
        }
    }
}

fn status(text: String) -> Event {
    Event::StatusText { text }
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round() as u64
}
