//! Sequencer behaviour over many cycles.

use proptest::prelude::*;
use ptaw_core::events::dispatch_all;
use ptaw_core::{
    DurationRange, Event, EventSink, PhaseConfig, PhaseKind, Preset, RepeatRange, Rgba,
    RunState, Sequencer, PHASE_COUNT,
};

fn phases(ranges: [(f64, f64); PHASE_COUNT]) -> [PhaseConfig; PHASE_COUNT] {
    PhaseKind::ALL.map(|kind| {
        let (min, max) = ranges[kind.index()];
        PhaseConfig::new(kind, DurationRange::new(min, max).unwrap(), Rgba::opaque(10, 20, 30))
    })
}

/// Tick at a fixed period until the current phase changes.
fn run_phase(seq: &mut Sequencer, tick_ms: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..1_000_000 {
        let batch = seq.tick(tick_ms);
        let changed = batch.iter().any(|e| matches!(e, Event::PhaseChanged { .. }));
        events.extend(batch);
        if changed {
            return events;
        }
    }
    panic!("phase never completed");
}

#[derive(Default)]
struct Ui {
    label: String,
    status: String,
    hits: u64,
    stopped: usize,
}

impl EventSink for Ui {
    fn on_phase_changed(&mut self, name: &str, _color: Rgba) {
        self.label = name.to_string();
    }
    fn on_status_text(&mut self, text: &str) {
        self.status = text.to_string();
    }
    fn on_hit_counter_changed(&mut self, total_hits: u64) {
        self.hits = total_hits;
    }
    fn on_sequence_stopped(&mut self) {
        self.stopped += 1;
    }
}

#[test]
fn hit_counter_grows_by_target_between_edging_entries() {
    let mut seq = Sequencer::with_seed(
        phases([(0.05, 0.2), (0.01, 0.01), (0.02, 0.05), (0.02, 0.03), (0.01, 0.01)]),
        RepeatRange::new(1, 4).unwrap(),
        2024,
    );
    seq.start();

    for _ in 0..20 {
        assert_eq!(seq.phase(PhaseKind::Edging).kind, seq.current_phase().kind);
        let hits_before = seq.total_hits();

        run_phase(&mut seq, 10); // Edging
        run_phase(&mut seq, 10); // Prepare
        let target = seq.hit_target();
        assert!((1..=4).contains(&target));

        while seq.current_phase().kind != PhaseKind::Edging {
            run_phase(&mut seq, 10);
        }
        assert_eq!(seq.total_hits() - hits_before, u64::from(target));
        assert_eq!(seq.repeat_progress(), 0);
    }
}

#[test]
fn sink_sees_cycle_and_single_stop() {
    let mut seq = Sequencer::with_seed(
        phases([(0.01, 0.01); PHASE_COUNT]),
        RepeatRange::new(2, 2).unwrap(),
        5,
    );
    let mut ui = Ui::default();

    dispatch_all(&seq.start(), &mut ui);
    assert_eq!(ui.label, "Edging");

    for _ in 0..8 {
        dispatch_all(&run_phase(&mut seq, 10), &mut ui);
    }
    // Edging, Prepare, Hit, Hold, Release, Hit, Hold, Release -> Edging
    assert_eq!(ui.label, "Edging");
    assert_eq!(ui.status, "Release");
    assert_eq!(ui.hits, 2);

    dispatch_all(&seq.stop(), &mut ui);
    dispatch_all(&seq.stop(), &mut ui);
    assert_eq!(ui.stopped, 1);
    assert_eq!(seq.state(), RunState::Idle);
}

#[test]
fn failed_apply_leaves_sequencer_unchanged() {
    let mut seq = Sequencer::with_seed(
        phases([(1.0, 2.0); PHASE_COUNT]),
        RepeatRange::new(1, 1).unwrap(),
        5,
    );
    let before = seq.phases().clone();

    let mut short = Preset::from_sequencer(&seq);
    short.phases.truncate(3);
    short.hit_count.max = 9;
    assert!(short.apply_to(&mut seq).is_err());

    let mut inverted = Preset::from_sequencer(&seq);
    inverted.phases[4].min = 10.0;
    inverted.phases[0].max = 99.0;
    assert!(inverted.apply_to(&mut seq).is_err());

    assert_eq!(seq.phases(), &before);
    assert_eq!(seq.repeat_range(), RepeatRange::new(1, 1).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stop_at_any_tick_is_clean(ticks in 0usize..400, seed: u64) {
        let mut seq = Sequencer::with_seed(
            phases([(0.05, 0.1), (0.02, 0.02), (0.01, 0.05), (0.01, 0.03), (0.02, 0.02)]),
            RepeatRange::new(0, 3).unwrap(),
            seed,
        );
        seq.start();
        for _ in 0..ticks {
            seq.tick(10);
        }
        let events = seq.stop();
        prop_assert_eq!(events, vec![Event::SequenceStopped]);
        prop_assert_eq!(seq.remaining_ms(), 0);
        prop_assert!(!seq.is_running());

        seq.start();
        prop_assert_eq!(seq.current_phase().kind, PhaseKind::Edging);
        prop_assert_eq!(seq.repeat_progress(), 0);
    }

    #[test]
    fn hit_target_within_range(min in 0u32..5, span in 0u32..5, seed: u64) {
        let mut seq = Sequencer::with_seed(
            phases([(0.01, 0.01); PHASE_COUNT]),
            RepeatRange::new(min, min + span).unwrap(),
            seed,
        );
        seq.start();
        run_phase(&mut seq, 10);
        run_phase(&mut seq, 10);
        prop_assert!(seq.hit_target() >= min && seq.hit_target() <= min + span);
    }

    #[test]
    fn countdown_never_increases_within_phase(seed: u64) {
        let mut seq = Sequencer::with_seed(
            phases([(1.0, 3.0); PHASE_COUNT]),
            RepeatRange::new(1, 2).unwrap(),
            seed,
        );
        let mut last = u64::MAX;
        for event in seq.start().into_iter().chain(run_phase(&mut seq, 10)) {
            match event {
                Event::CountdownTick { seconds_remaining } => {
                    prop_assert!(seconds_remaining <= last);
                    last = seconds_remaining;
                }
                Event::PhaseChanged { .. } => last = u64::MAX,
                _ => {}
            }
        }
    }
}
