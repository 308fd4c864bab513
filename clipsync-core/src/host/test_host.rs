use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::Sender;

use clipsync_types::{FieldValue, StepAttributes, StepPosition};

use super::{ClipEvent, HostClip, HostEvent};
use crate::error::{HostError, HostResult};

/// An operation recorded by `TestHost` for assertion in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    WriteField {
        position: StepPosition,
        value: FieldValue,
    },
    WriteStep {
        position: StepPosition,
        velocity: f64,
        duration: f64,
    },
    WriteFullStep {
        position: StepPosition,
        attributes: StepAttributes,
    },
    ToggleStep {
        position: StepPosition,
        velocity: f64,
    },
    ClearStep(StepPosition),
    ClearRow {
        lane: usize,
        row: usize,
    },
    ClearLane(usize),
    ClearAll,
    MoveStepPitch {
        position: StepPosition,
        new_row: usize,
    },
    Duplicate,
    DuplicateContent,
    Quantize(f64),
    Transpose(i32),
    ScrollBackwards,
    ScrollForward,
    SetStepLength(f64),
    SetClipParam(ClipEvent),
    SetObserving(bool),
}

struct HostState {
    ops: Vec<HostOp>,
    steps: HashMap<StepPosition, StepAttributes>,
    subscribers: Vec<Sender<HostEvent>>,
    can_hold_notes: bool,
    observing: bool,
    failing: bool,
}

/// In-memory host that records every call and keeps a simple step document.
///
/// Behaves like a real host where it matters to the engine: secondary-field
/// writes to a step that does not exist are ignored, and clip parameter
/// changes are echoed back to subscribers while observing. Cloning yields
/// another handle to the same host, so tests can keep one for assertions
/// while the engine owns the other.
#[derive(Clone)]
pub struct TestHost {
    inner: Arc<Mutex<HostState>>,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HostState {
                ops: Vec::new(),
                steps: HashMap::new(),
                subscribers: Vec::new(),
                can_hold_notes: true,
                observing: true,
                failing: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return all recorded operations.
    pub fn operations(&self) -> Vec<HostOp> {
        self.lock().ops.clone()
    }

    /// Clear recorded operations.
    pub fn clear(&self) {
        self.lock().ops.clear();
    }

    /// Count operations matching a predicate.
    pub fn count<F: Fn(&HostOp) -> bool>(&self, f: F) -> usize {
        self.lock().ops.iter().filter(|op| f(op)).count()
    }

    /// Find the first operation matching a predicate.
    pub fn find<F: Fn(&HostOp) -> bool>(&self, f: F) -> Option<HostOp> {
        self.lock().ops.iter().find(|op| f(op)).cloned()
    }

    /// Every full-step payload written for `position`, oldest first.
    pub fn full_writes(&self, position: StepPosition) -> Vec<StepAttributes> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                HostOp::WriteFullStep { position: p, attributes } if *p == position => {
                    Some(attributes.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Host-side document content for a step.
    pub fn step(&self, position: StepPosition) -> Option<StepAttributes> {
        self.lock().steps.get(&position).cloned()
    }

    /// Simulate the host (or another actor) changing a step, notifying subscribers.
    pub fn mutate_step(&self, position: StepPosition, attributes: StepAttributes) {
        let mut state = self.lock();
        state.steps.insert(position, attributes.clone());
        broadcast(&mut state, HostEvent::Step { position, attributes });
    }

    /// Push an arbitrary event to subscribers without touching the document.
    pub fn emit(&self, event: HostEvent) {
        broadcast(&mut self.lock(), event);
    }

    pub fn set_can_hold_note_data(&self, can_hold: bool) {
        let mut state = self.lock();
        state.can_hold_notes = can_hold;
        if state.observing {
            broadcast(&mut state, HostEvent::Clip(ClipEvent::CanHoldNoteData(can_hold)));
        }
    }

    /// Make every subsequent write fail.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn record(&self, op: HostOp) -> HostResult {
        let mut state = self.lock();
        let failing = state.failing;
        state.ops.push(op);
        if failing {
            Err(HostError::from("host rejected write"))
        } else {
            Ok(())
        }
    }

    fn record_clip_param(&self, event: ClipEvent) -> HostResult {
        self.record(HostOp::SetClipParam(event))?;
        let mut state = self.lock();
        if state.observing {
            broadcast(&mut state, HostEvent::Clip(event));
        }
        Ok(())
    }

    fn edit_steps(&self, f: impl FnOnce(&mut HashMap<StepPosition, StepAttributes>)) {
        f(&mut self.lock().steps);
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

fn broadcast(state: &mut HostState, event: HostEvent) {
    state
        .subscribers
        .retain(|tx| tx.send(event.clone()).is_ok());
}

impl HostClip for TestHost {
    fn subscribe(&self, events: Sender<HostEvent>) {
        self.lock().subscribers.push(events);
    }

    fn read_step(&self, position: StepPosition) -> HostResult<StepAttributes> {
        Ok(self.step(position).unwrap_or_default())
    }

    fn write_field(&self, position: StepPosition, value: FieldValue) -> HostResult {
        self.record(HostOp::WriteField { position, value })?;
        self.edit_steps(|steps| {
            if let Some(step) = steps.get_mut(&position).filter(|s| s.is_set()) {
                step.apply(value);
            }
        });
        Ok(())
    }

    fn write_step(&self, position: StepPosition, velocity: f64, duration: f64) -> HostResult {
        self.record(HostOp::WriteStep {
            position,
            velocity,
            duration,
        })?;
        self.edit_steps(|steps| {
            steps.insert(position, StepAttributes::note(velocity, duration));
        });
        Ok(())
    }

    fn write_full_step(&self, position: StepPosition, attributes: &StepAttributes) -> HostResult {
        self.record(HostOp::WriteFullStep {
            position,
            attributes: attributes.clone(),
        })?;
        self.edit_steps(|steps| {
            steps.insert(position, attributes.clone());
        });
        Ok(())
    }

    fn toggle_step(&self, position: StepPosition, velocity: f64) -> HostResult {
        self.record(HostOp::ToggleStep { position, velocity })?;
        self.edit_steps(|steps| {
            let was_set = steps.get(&position).is_some_and(|s| s.is_set());
            if was_set {
                steps.remove(&position);
            } else {
                steps.insert(position, StepAttributes::note(velocity, 0.25));
            }
        });
        Ok(())
    }

    fn clear_step(&self, position: StepPosition) -> HostResult {
        self.record(HostOp::ClearStep(position))?;
        self.edit_steps(|steps| {
            steps.remove(&position);
        });
        Ok(())
    }

    fn clear_row(&self, lane: usize, row: usize) -> HostResult {
        self.record(HostOp::ClearRow { lane, row })?;
        self.edit_steps(|steps| steps.retain(|p, _| !(p.lane == lane && p.row == row)));
        Ok(())
    }

    fn clear_lane(&self, lane: usize) -> HostResult {
        self.record(HostOp::ClearLane(lane))?;
        self.edit_steps(|steps| steps.retain(|p, _| p.lane != lane));
        Ok(())
    }

    fn clear_all(&self) -> HostResult {
        self.record(HostOp::ClearAll)?;
        self.edit_steps(|steps| steps.clear());
        Ok(())
    }

    fn move_step_pitch(&self, position: StepPosition, new_row: usize) -> HostResult {
        self.record(HostOp::MoveStepPitch { position, new_row })?;
        self.edit_steps(|steps| {
            if let Some(step) = steps.remove(&position) {
                steps.insert(position.with_row(new_row), step);
            }
        });
        Ok(())
    }

    fn duplicate(&self) -> HostResult {
        self.record(HostOp::Duplicate)
    }

    fn duplicate_content(&self) -> HostResult {
        self.record(HostOp::DuplicateContent)
    }

    fn quantize(&self, amount: f64) -> HostResult {
        self.record(HostOp::Quantize(amount))
    }

    fn transpose(&self, semitones: i32) -> HostResult {
        if !self.can_hold_note_data() {
            return Err(HostError::from("transpose on a track without note data"));
        }
        self.record(HostOp::Transpose(semitones))
    }

    fn scroll_steps_page_backwards(&self) -> HostResult {
        self.record(HostOp::ScrollBackwards)
    }

    fn scroll_steps_page_forward(&self) -> HostResult {
        self.record(HostOp::ScrollForward)
    }

    fn set_step_length(&self, beats: f64) -> HostResult {
        self.record(HostOp::SetStepLength(beats))
    }

    fn set_play_start(&self, beats: f64) -> HostResult {
        self.record_clip_param(ClipEvent::PlayStart(beats))
    }

    fn set_play_end(&self, beats: f64) -> HostResult {
        self.record_clip_param(ClipEvent::PlayEnd(beats))
    }

    fn set_loop_start(&self, beats: f64) -> HostResult {
        self.record_clip_param(ClipEvent::LoopStart(beats))
    }

    fn set_loop_length(&self, beats: f64) -> HostResult {
        self.record_clip_param(ClipEvent::LoopLength(beats))
    }

    fn set_loop_enabled(&self, enabled: bool) -> HostResult {
        self.record_clip_param(ClipEvent::LoopEnabled(enabled))
    }

    fn set_shuffle(&self, amount: f64) -> HostResult {
        self.record_clip_param(ClipEvent::Shuffle(amount))
    }

    fn set_accent(&self, amount: f64) -> HostResult {
        self.record_clip_param(ClipEvent::Accent(amount))
    }

    fn set_pinned(&self, pinned: bool) -> HostResult {
        self.record_clip_param(ClipEvent::Pinned(pinned))
    }

    fn set_color(&self, rgb: [f32; 3]) -> HostResult {
        self.record_clip_param(ClipEvent::Color(rgb))
    }

    fn set_observing(&self, enabled: bool) -> HostResult {
        self.record(HostOp::SetObserving(enabled))?;
        self.lock().observing = enabled;
        Ok(())
    }

    fn can_hold_note_data(&self) -> bool {
        self.lock().can_hold_notes
    }
}
