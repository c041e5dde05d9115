use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sequencer::Rgba;

/// Every presentation-visible change made by the sequencer produces an Event.
/// The sequencer returns them from its command methods; the UI layer
/// renders them, usually through an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new phase began: show its label and apply its color as background.
    PhaseChanged { name: String, color: Rgba },
    /// Replace the status label.
    StatusText { text: String },
    /// Whole seconds left in the current phase, rounded up.
    CountdownTick { seconds_remaining: u64 },
    /// Lifetime hit counter changed.
    HitCounterChanged { total_hits: u64 },
    /// Fire-and-forget audio cue.
    PlaySound { path: PathBuf },
    /// Sequence stopped: clear label, countdown and color, re-enable controls.
    SequenceStopped,
}

impl Event {
    /// Forward this event to the matching sink callback.
    pub fn dispatch(&self, sink: &mut dyn EventSink) {
        match self {
            Event::PhaseChanged { name, color } => sink.on_phase_changed(name, *color),
            Event::StatusText { text } => sink.on_status_text(text),
            Event::CountdownTick { seconds_remaining } => sink.on_countdown_tick(*seconds_remaining),
            Event::HitCounterChanged { total_hits } => sink.on_hit_counter_changed(*total_hits),
            Event::PlaySound { path } => sink.on_play_sound(path),
            Event::SequenceStopped => sink.on_sequence_stopped(),
        }
    }
}

/// Callback surface of the UI collaborator. All methods default to no-ops.
///
/// Implementations must not block: they run inside the tick loop.
pub trait EventSink {
    fn on_phase_changed(&mut self, _name: &str, _color: Rgba) {}
    fn on_status_text(&mut self, _text: &str) {}
    fn on_countdown_tick(&mut self, _seconds_remaining: u64) {}
    fn on_hit_counter_changed(&mut self, _total_hits: u64) {}
    fn on_play_sound(&mut self, _path: &Path) {}
    fn on_sequence_stopped(&mut self) {}
}

/// Dispatch a batch of events in order.
pub fn dispatch_all<'a>(events: impl IntoIterator<Item = &'a Event>, sink: &mut dyn EventSink) {
    for event in events {
        event.dispatch(sink);
    }
}

/// Records every callback as an [`Event`]; useful for tests and replay.
impl EventSink for Vec<Event> {
    fn on_phase_changed(&mut self, name: &str, color: Rgba) {
        self.push(Event::PhaseChanged {
            name: name.to_string(),
            color,
        });
    }

    fn on_status_text(&mut self, text: &str) {
        self.push(Event::StatusText {
            text: text.to_string(),
        });
    }

    fn on_countdown_tick(&mut self, seconds_remaining: u64) {
        self.push(Event::CountdownTick { seconds_remaining });
    }

    fn on_hit_counter_changed(&mut self, total_hits: u64) {
        self.push(Event::HitCounterChanged { total_hits });
    }

    fn on_play_sound(&mut self, path: &Path) {
        self.push(Event::PlaySound {
            path: path.to_path_buf(),
        });
    }

    fn on_sequence_stopped(&mut self) {
        self.push(Event::SequenceStopped);
    }
}
