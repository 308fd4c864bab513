//! The per-step attribute store.

use serde::{Deserialize, Serialize};

use super::field::{FieldValue, StepField};
use super::occurrence::Occurrence;
use crate::range::{self, clamp_recurrence_length, clamp_repeat_count};

/// What a grid cell holds at its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StepState {
    #[default]
    Off,
    /// A note starts here
    Onset,
    /// A note started earlier is still held
    Sustain,
}

/// Full musical description of one step.
///
/// Every setter clamps its input into the field's domain, so a stored value is
/// always in range no matter what the caller passed. Cloning yields a fully
/// independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct StepAttributes {
    state: StepState,
    muted: bool,
    duration: f64,
    velocity: f64,
    velocity_spread: f64,
    release_velocity: f64,
    pressure: f64,
    timbre: f64,
    pan: f64,
    transpose: f64,
    gain: f64,
    chance_enabled: bool,
    chance: f64,
    occurrence_enabled: bool,
    occurrence: Occurrence,
    recurrence_enabled: bool,
    recurrence_length: u8,
    recurrence_mask: u8,
    repeat_enabled: bool,
    repeat_count: i32,
    repeat_curve: f64,
    repeat_velocity_curve: f64,
    repeat_velocity_end: f64,
}

impl StepAttributes {
    /// The value every unmaterialized grid cell reads as.
    pub const EMPTY: StepAttributes = StepAttributes {
        state: StepState::Off,
        muted: false,
        duration: 0.0,
        velocity: 0.0,
        velocity_spread: 0.0,
        release_velocity: 0.0,
        pressure: 0.0,
        timbre: 0.0,
        pan: 0.0,
        transpose: 0.0,
        gain: 0.0,
        chance_enabled: false,
        chance: 1.0,
        occurrence_enabled: false,
        occurrence: Occurrence::Always,
        recurrence_enabled: false,
        recurrence_length: 1,
        recurrence_mask: 0xFF,
        repeat_enabled: false,
        repeat_count: 0,
        repeat_curve: 0.0,
        repeat_velocity_curve: 0.0,
        repeat_velocity_end: 0.0,
    };

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// A started note with the given primary pair.
    pub fn note(velocity: f64, duration: f64) -> Self {
        let mut step = Self::EMPTY;
        step.set_state(StepState::Onset);
        step.set_velocity(velocity);
        step.set_duration(duration);
        step
    }

    /// Replace this step's entire content with a copy of `other`.
    pub fn copy_from(&mut self, other: &StepAttributes) {
        self.clone_from(other);
    }

    /// Reset to the empty value.
    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    pub fn is_set(&self) -> bool {
        self.state != StepState::Off
    }

    // --- getters ---

    pub fn state(&self) -> StepState {
        self.state
    }
    pub fn is_muted(&self) -> bool {
        self.muted
    }
    pub fn duration(&self) -> f64 {
        self.duration
    }
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
    pub fn velocity_spread(&self) -> f64 {
        self.velocity_spread
    }
    pub fn release_velocity(&self) -> f64 {
        self.release_velocity
    }
    pub fn pressure(&self) -> f64 {
        self.pressure
    }
    pub fn timbre(&self) -> f64 {
        self.timbre
    }
    pub fn pan(&self) -> f64 {
        self.pan
    }
    pub fn transpose(&self) -> f64 {
        self.transpose
    }
    pub fn gain(&self) -> f64 {
        self.gain
    }
    pub fn is_chance_enabled(&self) -> bool {
        self.chance_enabled
    }
    pub fn chance(&self) -> f64 {
        self.chance
    }
    pub fn is_occurrence_enabled(&self) -> bool {
        self.occurrence_enabled
    }
    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }
    pub fn is_recurrence_enabled(&self) -> bool {
        self.recurrence_enabled
    }
    pub fn recurrence_length(&self) -> u8 {
        self.recurrence_length
    }
    pub fn recurrence_mask(&self) -> u8 {
        self.recurrence_mask
    }
    pub fn is_repeat_enabled(&self) -> bool {
        self.repeat_enabled
    }
    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }
    pub fn repeat_curve(&self) -> f64 {
        self.repeat_curve
    }
    pub fn repeat_velocity_curve(&self) -> f64 {
        self.repeat_velocity_curve
    }
    pub fn repeat_velocity_end(&self) -> f64 {
        self.repeat_velocity_end
    }

    // --- clamping setters ---

    pub fn set_state(&mut self, state: StepState) {
        self.state = state;
    }
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
    pub fn set_duration(&mut self, beats: f64) {
        self.duration = range::DURATION.clamp(beats);
    }
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = range::UNIT.clamp(velocity);
    }
    pub fn set_velocity_spread(&mut self, spread: f64) {
        self.velocity_spread = range::UNIT.clamp(spread);
    }
    pub fn set_release_velocity(&mut self, velocity: f64) {
        self.release_velocity = range::UNIT.clamp(velocity);
    }
    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = range::UNIT.clamp(pressure);
    }
    pub fn set_timbre(&mut self, timbre: f64) {
        self.timbre = range::BIPOLAR.clamp(timbre);
    }
    pub fn set_pan(&mut self, pan: f64) {
        self.pan = range::BIPOLAR.clamp(pan);
    }
    pub fn set_transpose(&mut self, semitones: f64) {
        self.transpose = range::TRANSPOSE.clamp(semitones);
    }
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = range::UNIT.clamp(gain);
    }
    pub fn set_chance_enabled(&mut self, enabled: bool) {
        self.chance_enabled = enabled;
    }
    pub fn set_chance(&mut self, chance: f64) {
        self.chance = range::UNIT.clamp(chance);
    }
    pub fn set_occurrence_enabled(&mut self, enabled: bool) {
        self.occurrence_enabled = enabled;
    }
    pub fn set_occurrence(&mut self, occurrence: Occurrence) {
        self.occurrence = occurrence;
    }
    pub fn set_recurrence_enabled(&mut self, enabled: bool) {
        self.recurrence_enabled = enabled;
    }
    pub fn set_recurrence_length(&mut self, length: i32) {
        self.recurrence_length = clamp_recurrence_length(length);
    }
    pub fn set_recurrence_mask(&mut self, mask: u8) {
        self.recurrence_mask = mask;
    }
    pub fn set_repeat_enabled(&mut self, enabled: bool) {
        self.repeat_enabled = enabled;
    }
    pub fn set_repeat_count(&mut self, count: i32) {
        self.repeat_count = clamp_repeat_count(count);
    }
    pub fn set_repeat_curve(&mut self, curve: f64) {
        self.repeat_curve = range::BIPOLAR.clamp(curve);
    }
    pub fn set_repeat_velocity_curve(&mut self, curve: f64) {
        self.repeat_velocity_curve = range::BIPOLAR.clamp(curve);
    }
    pub fn set_repeat_velocity_end(&mut self, end: f64) {
        self.repeat_velocity_end = range::BIPOLAR.clamp(end);
    }

    /// Step the occurrence condition forwards or backwards, clamping at the ends.
    pub fn cycle_occurrence(&mut self, forward: bool) {
        self.occurrence = if forward {
            self.occurrence.next()
        } else {
            self.occurrence.prev()
        };
    }

    /// Whether this step plays on the given recurrence cycle (0-based).
    pub fn plays_on_recurrence(&self, cycle: usize) -> bool {
        if !self.recurrence_enabled {
            return true;
        }
        let bit = cycle % self.recurrence_length as usize;
        self.recurrence_mask & (1 << bit) != 0
    }

    /// Display form of the repeat count: "Off", "N" hits, or "1/N" of the step.
    pub fn repeat_count_label(&self) -> String {
        match self.repeat_count {
            0 => "Off".to_string(),
            n if n > 0 => (n + 1).to_string(),
            n => format!("1/{}", n.unsigned_abs() + 1),
        }
    }

    // --- field-keyed access ---

    pub fn get(&self, field: StepField) -> FieldValue {
        match field {
            StepField::State => FieldValue::State(self.state),
            StepField::Muted => FieldValue::Muted(self.muted),
            StepField::Duration => FieldValue::Duration(self.duration),
            StepField::Velocity => FieldValue::Velocity(self.velocity),
            StepField::VelocitySpread => FieldValue::VelocitySpread(self.velocity_spread),
            StepField::ReleaseVelocity => FieldValue::ReleaseVelocity(self.release_velocity),
            StepField::Pressure => FieldValue::Pressure(self.pressure),
            StepField::Timbre => FieldValue::Timbre(self.timbre),
            StepField::Pan => FieldValue::Pan(self.pan),
            StepField::Transpose => FieldValue::Transpose(self.transpose),
            StepField::Gain => FieldValue::Gain(self.gain),
            StepField::ChanceEnabled => FieldValue::ChanceEnabled(self.chance_enabled),
            StepField::Chance => FieldValue::Chance(self.chance),
            StepField::OccurrenceEnabled => FieldValue::OccurrenceEnabled(self.occurrence_enabled),
            StepField::Occurrence => FieldValue::Occurrence(self.occurrence),
            StepField::RecurrenceEnabled => FieldValue::RecurrenceEnabled(self.recurrence_enabled),
            StepField::RecurrenceLength => {
                FieldValue::RecurrenceLength(self.recurrence_length as i32)
            }
            StepField::RecurrenceMask => FieldValue::RecurrenceMask(self.recurrence_mask),
            StepField::RepeatEnabled => FieldValue::RepeatEnabled(self.repeat_enabled),
            StepField::RepeatCount => FieldValue::RepeatCount(self.repeat_count),
            StepField::RepeatCurve => FieldValue::RepeatCurve(self.repeat_curve),
            StepField::RepeatVelocityCurve => {
                FieldValue::RepeatVelocityCurve(self.repeat_velocity_curve)
            }
            StepField::RepeatVelocityEnd => FieldValue::RepeatVelocityEnd(self.repeat_velocity_end),
        }
    }

    /// Store one field (clamped) and return the value actually stored.
    pub fn apply(&mut self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::State(v) => self.set_state(v),
            FieldValue::Muted(v) => self.set_muted(v),
            FieldValue::Duration(v) => self.set_duration(v),
            FieldValue::Velocity(v) => self.set_velocity(v),
            FieldValue::VelocitySpread(v) => self.set_velocity_spread(v),
            FieldValue::ReleaseVelocity(v) => self.set_release_velocity(v),
            FieldValue::Pressure(v) => self.set_pressure(v),
            FieldValue::Timbre(v) => self.set_timbre(v),
            FieldValue::Pan(v) => self.set_pan(v),
            FieldValue::Transpose(v) => self.set_transpose(v),
            FieldValue::Gain(v) => self.set_gain(v),
            FieldValue::ChanceEnabled(v) => self.set_chance_enabled(v),
            FieldValue::Chance(v) => self.set_chance(v),
            FieldValue::OccurrenceEnabled(v) => self.set_occurrence_enabled(v),
            FieldValue::Occurrence(v) => self.set_occurrence(v),
            FieldValue::RecurrenceEnabled(v) => self.set_recurrence_enabled(v),
            FieldValue::RecurrenceLength(v) => self.set_recurrence_length(v),
            FieldValue::RecurrenceMask(v) => self.set_recurrence_mask(v),
            FieldValue::RepeatEnabled(v) => self.set_repeat_enabled(v),
            FieldValue::RepeatCount(v) => self.set_repeat_count(v),
            FieldValue::RepeatCurve(v) => self.set_repeat_curve(v),
            FieldValue::RepeatVelocityCurve(v) => self.set_repeat_velocity_curve(v),
            FieldValue::RepeatVelocityEnd(v) => self.set_repeat_velocity_end(v),
        }
        self.get(value.field())
    }

    /// Add `delta` to a continuous field. Returns the stored value, or `None`
    /// for flags, enums and the recurrence mask.
    pub fn nudge(&mut self, field: StepField, delta: f64) -> Option<FieldValue> {
        let current = self.get(field).as_f64()?;
        let target = FieldValue::from_f64(field, current + delta)?;
        Some(self.apply(target))
    }

    /// Everything except the primary (velocity, duration) pair and the state,
    /// in the order a host must receive them after the step exists.
    pub fn secondary_fields(&self) -> Vec<FieldValue> {
        [
            StepField::Muted,
            StepField::VelocitySpread,
            StepField::ReleaseVelocity,
            StepField::Pressure,
            StepField::Timbre,
            StepField::Pan,
            StepField::Transpose,
            StepField::Gain,
            StepField::ChanceEnabled,
            StepField::Chance,
            StepField::OccurrenceEnabled,
            StepField::Occurrence,
            StepField::RecurrenceEnabled,
            StepField::RecurrenceLength,
            StepField::RecurrenceMask,
            StepField::RepeatEnabled,
            StepField::RepeatCount,
            StepField::RepeatCurve,
            StepField::RepeatVelocityCurve,
            StepField::RepeatVelocityEnd,
        ]
        .into_iter()
        .map(|f| self.get(f))
        .collect()
    }
}

impl Default for StepAttributes {
    fn default() -> Self {
        Self::EMPTY
    }
}
