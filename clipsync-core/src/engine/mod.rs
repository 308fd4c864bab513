//! ClipSync: the step-clip cache and edit-session synchronizer.
//!
//! The engine owns the sparse step grid for one clip view and decides, per
//! write, whether the host hears about it now (untracked positions) or on the
//! next re-assertion tick (positions under an edit session). Host changes
//! arrive as `HostEvent`s and are folded into the grid unless the position is
//! being edited locally.
//!
//! Nothing here blocks. Deferred work sits in a timer queue that `poll()`
//! runs against the engine's `Clock`; `SyncRuntime` calls it from a thread.

mod clip_ops;
pub(crate) mod schedule;
mod session;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use clipsync_types::{
    FieldValue, GridDims, Occurrence, StepAttributes, StepField, StepPosition, StepState,
};

use self::schedule::{Task, TaskQueue};
use crate::clip::ClipParams;
use crate::clock::{Clock, SystemClock};
use crate::error::HostResult;
use crate::grid::StepGrid;
use crate::host::{HostClip, HostEvent};

/// Engine tuning. `Config::sync_settings()` builds one from TOML.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub dims: GridDims,
    /// Cadence of the re-assertion push while an edit session is open.
    pub reassert_interval: Duration,
    /// Gap between creating a step and writing its secondary attributes.
    pub secondary_write_delay: Duration,
    /// Beats per column.
    pub step_length: f64,
    pub toggle_velocity: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            dims: GridDims::default(),
            reassert_interval: Duration::from_millis(100),
            secondary_write_delay: Duration::from_millis(100),
            step_length: 0.25,
            toggle_velocity: 0.8,
        }
    }
}

/// Fire-and-forget: log host failures, never retry.
fn report(what: &str, result: HostResult) {
    if let Err(e) = result {
        log::warn!(target: "host", "{} failed: {}", what, e);
    }
}

pub struct ClipSync {
    host: Box<dyn HostClip>,
    clock: Arc<dyn Clock>,
    settings: SyncSettings,
    grid: StepGrid,
    /// Positions under local edit authority.
    editing: BTreeSet<StepPosition>,
    tasks: TaskQueue,
    events: Receiver<HostEvent>,
    clip: ClipParams,
    edit_page: usize,
    step_length: f64,
}

macro_rules! step_setters {
    ($($name:ident => $variant:ident($ty:ty);)*) => {
        $(
            pub fn $name(&mut self, position: StepPosition, value: $ty) {
                self.update_step(position, FieldValue::$variant(value));
            }
        )*
    };
}

impl ClipSync {
    pub fn new(host: Box<dyn HostClip>, settings: SyncSettings) -> Self {
        Self::with_clock(host, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(host: Box<dyn HostClip>, settings: SyncSettings, clock: Arc<dyn Clock>) -> Self {
        let (events_tx, events) = crossbeam_channel::unbounded();
        host.subscribe(events_tx);
        Self {
            grid: StepGrid::new(settings.dims),
            step_length: settings.step_length,
            host,
            clock,
            settings,
            editing: BTreeSet::new(),
            tasks: TaskQueue::default(),
            events,
            clip: ClipParams::new(),
            edit_page: 0,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn dims(&self) -> GridDims {
        self.grid.dims()
    }

    pub fn grid(&self) -> &StepGrid {
        &self.grid
    }

    // --- host notifications and timers ---

    /// Apply every pending host notification. Returns how many were handled.
    pub fn drain_host_events(&mut self) -> usize {
        let pending: Vec<HostEvent> = self.events.try_iter().collect();
        let count = pending.len();
        for event in pending {
            self.apply_host_event(event);
        }
        count
    }

    fn apply_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Step { position, attributes } => {
                if self.editing.contains(&position) {
                    log::debug!(target: "sync", "host change for {} ignored, under edit", position);
                    return;
                }
                if let Err(e) = self.grid.store(position, &attributes) {
                    log::warn!(target: "grid", "host change dropped: {}", e);
                }
            }
            HostEvent::Clip(event) => self.clip.apply(event),
        }
    }

    /// Run all scheduled work that is due. Returns how many tasks ran.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some(task) = self.tasks.pop_due(now) {
            ran += 1;
            match task {
                Task::Reassert => self.reassert(now),
                Task::SecondaryWrite { position, attributes } => {
                    self.write_secondary(position, &attributes)
                }
            }
        }
        ran
    }

    /// When the next scheduled task falls due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    // --- step reads ---

    pub fn get_step(&self, position: StepPosition) -> StepAttributes {
        self.grid.get(position)
    }

    /// Pull the host's copy of a step into the grid. Skipped under edit.
    pub fn refresh_step(&mut self, position: StepPosition) {
        if self.editing.contains(&position) {
            return;
        }
        match self.host.read_step(position) {
            Ok(step) => {
                if let Err(e) = self.grid.store(position, &step) {
                    log::warn!(target: "grid", "refresh dropped: {}", e);
                }
            }
            Err(e) => log::warn!(target: "host", "read_step {} failed: {}", position, e),
        }
    }

    // --- per-field writes ---

    /// Clamp and store one attribute, then forward it now or defer it to the
    /// edit session's re-assertion.
    pub fn update_step(&mut self, position: StepPosition, value: FieldValue) {
        match self.grid.update(position, |step| step.apply(value)) {
            Ok(stored) => self.forward_field(position, stored),
            Err(e) => log::warn!(target: "grid", "write dropped: {}", e),
        }
    }

    step_setters! {
        update_step_state => State(StepState);
        update_step_muted => Muted(bool);
        update_step_duration => Duration(f64);
        update_step_velocity => Velocity(f64);
        update_step_velocity_spread => VelocitySpread(f64);
        update_step_release_velocity => ReleaseVelocity(f64);
        update_step_pressure => Pressure(f64);
        update_step_timbre => Timbre(f64);
        update_step_pan => Pan(f64);
        update_step_transpose => Transpose(f64);
        update_step_gain => Gain(f64);
        update_step_chance_enabled => ChanceEnabled(bool);
        update_step_chance => Chance(f64);
        update_step_occurrence_enabled => OccurrenceEnabled(bool);
        update_step_occurrence => Occurrence(Occurrence);
        update_step_recurrence_enabled => RecurrenceEnabled(bool);
        update_step_recurrence_length => RecurrenceLength(i32);
        update_step_recurrence_mask => RecurrenceMask(u8);
        update_step_repeat_enabled => RepeatEnabled(bool);
        update_step_repeat_count => RepeatCount(i32);
        update_step_repeat_curve => RepeatCurve(f64);
        update_step_repeat_velocity_curve => RepeatVelocityCurve(f64);
        update_step_repeat_velocity_end => RepeatVelocityEnd(f64);
    }

    /// Relative change of a continuous field (knob turn).
    pub fn change_step(&mut self, position: StepPosition, field: StepField, delta: f64) {
        match self.grid.update(position, |step| step.nudge(field, delta)) {
            Ok(Some(stored)) => self.forward_field(position, stored),
            Ok(None) => {
                log::debug!(target: "sync", "{} has no relative adjustment", field.name())
            }
            Err(e) => log::warn!(target: "grid", "write dropped: {}", e),
        }
    }

    pub fn cycle_step_occurrence(&mut self, position: StepPosition, forward: bool) {
        let result = self.grid.update(position, |step| {
            step.cycle_occurrence(forward);
            step.get(StepField::Occurrence)
        });
        match result {
            Ok(stored) => self.forward_field(position, stored),
            Err(e) => log::warn!(target: "grid", "write dropped: {}", e),
        }
    }

    fn forward_field(&self, position: StepPosition, value: FieldValue) {
        if self.editing.contains(&position) {
            return;
        }
        report("write_field", self.host.write_field(position, value));
    }

    // --- whole-step writes ---

    /// Transplant a full step. The primary pair goes to the host now so the
    /// step exists; the remaining attributes follow after the configured delay.
    /// An unset source clears the position instead.
    pub fn set_step(&mut self, position: StepPosition, source: &StepAttributes) {
        if !source.is_set() {
            self.clear_step(position);
            return;
        }
        let copy = source.clone();
        if let Err(e) = self.grid.store(position, &copy) {
            log::warn!(target: "grid", "write dropped: {}", e);
            return;
        }
        self.cancel_secondary_at(position);
        report(
            "write_step",
            self.host.write_step(position, copy.velocity(), copy.duration()),
        );
        let due = self.clock.now() + self.settings.secondary_write_delay;
        self.tasks.schedule(
            due,
            Task::SecondaryWrite {
                position,
                attributes: copy,
            },
        );
    }

    /// A second phase still queued for `position` belongs to content that
    /// has since been replaced.
    fn cancel_secondary_at(&mut self, position: StepPosition) {
        if self.tasks.cancel_secondary(|p| p == position) > 0 {
            log::debug!(target: "sync", "pending attribute write for {} dropped", position);
        }
    }

    fn write_secondary(&self, position: StepPosition, attributes: &StepAttributes) {
        for value in attributes.secondary_fields() {
            report("write_field", self.host.write_field(position, value));
        }
    }

    /// Start a note with the given primary pair, resetting other attributes.
    pub fn set_step_note(&mut self, position: StepPosition, velocity: f64, duration: f64) {
        let step = StepAttributes::note(velocity, duration);
        if let Err(e) = self.grid.store(position, &step) {
            log::warn!(target: "grid", "write dropped: {}", e);
            return;
        }
        self.cancel_secondary_at(position);
        report(
            "write_step",
            self.host.write_step(position, step.velocity(), step.duration()),
        );
    }

    /// Flip a step between Off and a one-column note.
    pub fn toggle_step(&mut self, position: StepPosition, velocity: f64) {
        let step_length = self.step_length;
        let result = self.grid.update(position, |step| {
            if step.is_set() {
                step.clear();
            } else {
                step.copy_from(&StepAttributes::note(velocity, step_length));
            }
        });
        match result {
            Ok(()) => {
                self.cancel_secondary_at(position);
                report("toggle_step", self.host.toggle_step(position, velocity));
            }
            Err(e) => log::warn!(target: "grid", "toggle dropped: {}", e),
        }
    }

    /// `toggle_step` with the configured default velocity.
    pub fn toggle_step_default(&mut self, position: StepPosition) {
        self.toggle_step(position, self.settings.toggle_velocity);
    }

    pub fn clear_step(&mut self, position: StepPosition) {
        match self.grid.clear_step(position) {
            Ok(()) => {
                self.cancel_secondary_at(position);
                report("clear_step", self.host.clear_step(position));
            }
            Err(e) => log::warn!(target: "grid", "clear dropped: {}", e),
        }
    }

    pub fn clear_row(&mut self, lane: usize, row: usize) {
        let dims = self.dims();
        if lane >= dims.lanes || row >= dims.rows {
            log::warn!(target: "grid", "clear of lane {} row {} outside grid {}", lane, row, dims);
            return;
        }
        self.grid.clear_row(lane, row);
        self.tasks.cancel_secondary(|p| p.lane == lane && p.row == row);
        report("clear_row", self.host.clear_row(lane, row));
    }

    pub fn clear_lane(&mut self, lane: usize) {
        if lane >= self.dims().lanes {
            log::warn!(target: "grid", "clear of lane {} outside grid {}", lane, self.dims());
            return;
        }
        self.grid.clear_lane(lane);
        self.tasks.cancel_secondary(|p| p.lane == lane);
        report("clear_lane", self.host.clear_lane(lane));
    }

    pub fn clear_all(&mut self) {
        self.grid.clear_all();
        self.tasks.cancel_secondary(|_| true);
        report("clear_all", self.host.clear_all());
    }

    /// Move a step to another pitch row. An edited step stays edited at its
    /// new row.
    pub fn move_step_pitch(&mut self, position: StepPosition, new_row: usize) {
        if let Err(e) = self.grid.move_step(position, new_row) {
            log::warn!(target: "grid", "move dropped: {}", e);
            return;
        }
        let target = position.with_row(new_row);
        if target != position {
            self.cancel_secondary_at(target);
            self.tasks.retarget_secondary(position, target);
        }
        if self.editing.remove(&position) {
            self.editing.insert(target);
        }
        report("move_step_pitch", self.host.move_step_pitch(position, new_row));
    }

    // --- row queries ---

    pub fn has_row_data(&self, lane: usize, row: usize) -> bool {
        self.grid.has_row_data(lane, row)
    }

    pub fn has_any_row_data(&self, row: usize) -> bool {
        self.grid.has_any_row_data(row)
    }

    pub fn lowest_row_with_data(&self, lane: usize) -> Option<usize> {
        self.grid.lowest_row_with_data(lane)
    }

    pub fn highest_row_with_data(&self, lane: usize) -> Option<usize> {
        self.grid.highest_row_with_data(lane)
    }

    pub fn lowest_row_with_data_any(&self) -> Option<usize> {
        self.grid.lowest_row_with_data_any()
    }

    pub fn highest_row_with_data_any(&self) -> Option<usize> {
        self.grid.highest_row_with_data_any()
    }
}
