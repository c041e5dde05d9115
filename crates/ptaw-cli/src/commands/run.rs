use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use clap::Args;
use ptaw_core::{Config, Event, EventSink, PhaseKind, PresetStore, Rgba, Sequencer};

#[derive(Args)]
pub struct RunArgs {
    /// Preset to apply (defaults to presets.default_preset)
    #[arg(long)]
    preset: Option<String>,
    /// Stop after this many completed cycles; runs until killed otherwise
    #[arg(long)]
    cycles: Option<u64>,
    /// Seed for duration and hit target draws
    #[arg(long)]
    seed: Option<u64>,
    /// Do not play sound cues
    #[arg(long)]
    mute: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if args.seed.is_some() {
        config.timer.seed = args.seed;
    }
    if args.mute {
        config.sounds.enabled = false;
    }

    let mut seq = Sequencer::from_config(&config);
    let mut store = PresetStore::open(&config)?;
    let preset = match args.preset {
        Some(name) => Some(name),
        None => store
            .initial_preset(Some(config.presets.default_preset.as_str()))
            .map(String::from),
    };
    match &preset {
        Some(name) => store.apply_to(&mut seq, name)?,
        None => tracing::warn!("preset store is empty, using built-in timings"),
    }

    let mut sink = TerminalSink::new(args.json, args.cycles);
    if !args.json {
        println!("preset: {}", preset.as_deref().unwrap_or("(none)"));
    }

    let tick = Duration::from_millis(config.timer.tick_ms);
    sink.emit(&seq.start())?;
    let mut last = Instant::now();
    while !sink.finished() {
        std::thread::sleep(tick);
        let elapsed = u64::try_from(last.elapsed().as_millis()).unwrap_or(u64::MAX);
        // Advance by whole milliseconds only so the remainder carries over.
        last += Duration::from_millis(elapsed);
        sink.emit(&seq.tick(elapsed))?;
    }
    sink.emit(&seq.stop())?;
    Ok(())
}

/// Renders sequencer events on stdout and plays sound cues.
struct TerminalSink {
    json: bool,
    max_cycles: Option<u64>,
    edging_entries: u64,
    countdown_open: bool,
}

impl TerminalSink {
    fn new(json: bool, max_cycles: Option<u64>) -> Self {
        Self {
            json,
            max_cycles,
            edging_entries: 0,
            countdown_open: false,
        }
    }

    fn emit(&mut self, events: &[Event]) -> serde_json::Result<()> {
        for event in events {
            if self.json {
                println!("{}", serde_json::to_string(event)?);
            }
            event.dispatch(self);
        }
        Ok(())
    }

    /// Every entry into Edging after the first closes a cycle.
    fn cycles_completed(&self) -> u64 {
        self.edging_entries.saturating_sub(1)
    }

    fn finished(&self) -> bool {
        self.max_cycles.is_some_and(|max| self.cycles_completed() >= max)
    }

    fn line(&mut self, text: &str) {
        if self.json {
            return;
        }
        if self.countdown_open {
            println!();
            self.countdown_open = false;
        }
        println!("{text}");
    }
}

impl EventSink for TerminalSink {
    fn on_phase_changed(&mut self, name: &str, color: Rgba) {
        if name == PhaseKind::Edging.label() {
            self.edging_entries += 1;
        }
        self.line(&format!("== {name} ({})", color.to_hex()));
    }

    fn on_status_text(&mut self, text: &str) {
        self.line(&format!("   {text}"));
    }

    fn on_countdown_tick(&mut self, seconds_remaining: u64) {
        if self.json {
            return;
        }
        print!("\r   {seconds_remaining:>4}s ");
        let _ = std::io::stdout().flush();
        self.countdown_open = true;
    }

    fn on_hit_counter_changed(&mut self, total_hits: u64) {
        self.line(&format!("   hits: {total_hits}"));
    }

    fn on_play_sound(&mut self, path: &Path) {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "sound file not found");
            return;
        }
        if let Err(e) = open::that_detached(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to play sound");
        }
    }

    fn on_sequence_stopped(&mut self) {
        self.line("stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edging() -> Event {
        Event::PhaseChanged {
            name: PhaseKind::Edging.label().to_string(),
            color: Rgba::opaque(0, 0, 0),
        }
    }

    #[test]
    fn first_edging_entry_is_not_a_cycle() {
        let mut sink = TerminalSink::new(true, Some(1));
        sink.emit(&[edging()]).unwrap();
        assert!(!sink.finished());
        sink.emit(&[edging()]).unwrap();
        assert!(sink.finished());
    }

    #[test]
    fn unbounded_run_never_finishes() {
        let mut sink = TerminalSink::new(true, None);
        sink.emit(&[edging(), edging(), edging()]).unwrap();
        assert_eq!(sink.cycles_completed(), 2);
        assert!(!sink.finished());
    }
}
