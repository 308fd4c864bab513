mod common;

use std::time::Duration;

use clipsync_core::host::HostOp;
use clipsync_types::{StepAttributes, StepPosition};

#[test]
fn knob_turn_under_edit_survives_stale_host_echo() {
    let (mut engine, host, clock) = common::manual_engine();
    let p = StepPosition::new(0, 5, 60);
    engine.set_step_note(p, 0.5, 0.25);

    engine.start_edit([p]);
    for v in [0.55, 0.6, 0.65, 0.7] {
        engine.update_step_velocity(p, v);
        // host lags behind and reports the value it last saw
        host.mutate_step(p, StepAttributes::note(0.5, 0.25));
        engine.drain_host_events();
    }
    assert_eq!(engine.get_step(p).velocity(), 0.7);

    clock.advance(Duration::from_millis(100));
    engine.poll();
    assert_eq!(host.step(p).map(|s| s.velocity()), Some(0.7));

    engine.stop_edit();
    clock.advance(Duration::from_millis(100));
    engine.poll();
    assert_eq!(engine.pending_tasks(), 0);

    host.mutate_step(p, StepAttributes::note(0.3, 0.25));
    engine.drain_host_events();
    assert_eq!(engine.get_step(p).velocity(), 0.3);
}

#[test]
fn copy_paste_transplants_attributes_to_a_new_step() {
    let (mut engine, host, clock) = common::manual_engine();
    let from = StepPosition::new(0, 0, 48);
    let to = StepPosition::new(0, 8, 50);

    engine.set_step_note(from, 0.9, 1.0);
    engine.update_step_timbre(from, -0.4);
    engine.update_step_chance_enabled(from, true);
    engine.update_step_chance(from, 0.5);
    let copied = engine.get_step(from);

    host.clear();
    engine.set_step(to, &copied);
    // the host only knows the primary pair until the delayed phase runs
    assert_eq!(host.step(to).map(|s| s.timbre()), Some(0.0));

    clock.advance(Duration::from_millis(100));
    engine.poll();
    assert_eq!(host.step(to), Some(copied));
    assert_eq!(host.count(|op| matches!(op, HostOp::WriteField { .. })), 20);
}

#[test]
fn multi_step_session_reasserts_every_member() {
    let (mut engine, host, clock) = common::manual_engine();
    let steps: Vec<StepPosition> = (0..4).map(|c| StepPosition::new(1, c, 36)).collect();
    for &p in &steps {
        engine.toggle_step(p, 0.8);
    }

    engine.start_edit(steps.iter().copied());
    for &p in &steps {
        engine.update_step_gain(p, 0.25);
    }
    clock.advance(Duration::from_millis(100));
    engine.poll();

    for &p in &steps {
        let pushed = host.full_writes(p);
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].gain(), 0.25);
    }
    engine.stop_edit();
    assert!(engine.editing_positions().is_empty());
}

#[test]
fn clear_all_resets_grid_and_host() {
    let (mut engine, host, _) = common::manual_engine();
    engine.set_step_note(StepPosition::new(0, 0, 1), 0.5, 0.25);
    engine.set_step_note(StepPosition::new(3, 9, 100), 0.5, 0.25);
    engine.clear_all();
    assert_eq!(engine.lowest_row_with_data_any(), None);
    assert_eq!(host.step(StepPosition::new(3, 9, 100)), None);
    assert_eq!(host.operations().last(), Some(&HostOp::ClearAll));
}
