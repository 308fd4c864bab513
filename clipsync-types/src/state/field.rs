//! Field-keyed access to step attributes.
//!
//! `StepField` names a single attribute; `FieldValue` carries a typed value for
//! exactly one attribute. Hosts receive per-field writes as `FieldValue`s, and
//! controllers address knobs by `StepField`.

use serde::{Deserialize, Serialize};

use super::occurrence::Occurrence;
use super::step::StepState;
use crate::range::{self, Domain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepField {
    State,
    Muted,
    Duration,
    Velocity,
    VelocitySpread,
    ReleaseVelocity,
    Pressure,
    Timbre,
    Pan,
    Transpose,
    Gain,
    ChanceEnabled,
    Chance,
    OccurrenceEnabled,
    Occurrence,
    RecurrenceEnabled,
    RecurrenceLength,
    RecurrenceMask,
    RepeatEnabled,
    RepeatCount,
    RepeatCurve,
    RepeatVelocityCurve,
    RepeatVelocityEnd,
}

impl StepField {
    /// Float domain for continuous fields, `None` for flags, enums and integers.
    pub fn domain(self) -> Option<Domain> {
        match self {
            StepField::Duration => Some(range::DURATION),
            StepField::Velocity
            | StepField::VelocitySpread
            | StepField::ReleaseVelocity
            | StepField::Pressure
            | StepField::Gain
            | StepField::Chance => Some(range::UNIT),
            StepField::Timbre
            | StepField::Pan
            | StepField::RepeatCurve
            | StepField::RepeatVelocityCurve
            | StepField::RepeatVelocityEnd => Some(range::BIPOLAR),
            StepField::Transpose => Some(range::TRANSPOSE),
            _ => None,
        }
    }

    /// Whether relative (knob) changes make sense for this field.
    pub fn is_continuous(self) -> bool {
        self.domain().is_some()
            || matches!(self, StepField::RecurrenceLength | StepField::RepeatCount)
    }

    pub fn name(self) -> &'static str {
        match self {
            StepField::State => "State",
            StepField::Muted => "Mute",
            StepField::Duration => "Duration",
            StepField::Velocity => "Velocity",
            StepField::VelocitySpread => "Velocity Spread",
            StepField::ReleaseVelocity => "Release Velocity",
            StepField::Pressure => "Pressure",
            StepField::Timbre => "Timbre",
            StepField::Pan => "Pan",
            StepField::Transpose => "Transpose",
            StepField::Gain => "Gain",
            StepField::ChanceEnabled => "Chance On",
            StepField::Chance => "Chance",
            StepField::OccurrenceEnabled => "Occurrence On",
            StepField::Occurrence => "Occurrence",
            StepField::RecurrenceEnabled => "Recurrence On",
            StepField::RecurrenceLength => "Recurrence Length",
            StepField::RecurrenceMask => "Recurrence Mask",
            StepField::RepeatEnabled => "Repeat On",
            StepField::RepeatCount => "Repeat Count",
            StepField::RepeatCurve => "Repeat Curve",
            StepField::RepeatVelocityCurve => "Repeat Velocity Curve",
            StepField::RepeatVelocityEnd => "Repeat Velocity End",
        }
    }
}

/// A typed value for one step attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    State(StepState),
    Muted(bool),
    Duration(f64),
    Velocity(f64),
    VelocitySpread(f64),
    ReleaseVelocity(f64),
    Pressure(f64),
    Timbre(f64),
    Pan(f64),
    Transpose(f64),
    Gain(f64),
    ChanceEnabled(bool),
    Chance(f64),
    OccurrenceEnabled(bool),
    Occurrence(Occurrence),
    RecurrenceEnabled(bool),
    RecurrenceLength(i32),
    RecurrenceMask(u8),
    RepeatEnabled(bool),
    RepeatCount(i32),
    RepeatCurve(f64),
    RepeatVelocityCurve(f64),
    RepeatVelocityEnd(f64),
}

impl FieldValue {
    pub fn field(&self) -> StepField {
        match self {
            FieldValue::State(_) => StepField::State,
            FieldValue::Muted(_) => StepField::Muted,
            FieldValue::Duration(_) => StepField::Duration,
            FieldValue::Velocity(_) => StepField::Velocity,
            FieldValue::VelocitySpread(_) => StepField::VelocitySpread,
            FieldValue::ReleaseVelocity(_) => StepField::ReleaseVelocity,
            FieldValue::Pressure(_) => StepField::Pressure,
            FieldValue::Timbre(_) => StepField::Timbre,
            FieldValue::Pan(_) => StepField::Pan,
            FieldValue::Transpose(_) => StepField::Transpose,
            FieldValue::Gain(_) => StepField::Gain,
            FieldValue::ChanceEnabled(_) => StepField::ChanceEnabled,
            FieldValue::Chance(_) => StepField::Chance,
            FieldValue::OccurrenceEnabled(_) => StepField::OccurrenceEnabled,
            FieldValue::Occurrence(_) => StepField::Occurrence,
            FieldValue::RecurrenceEnabled(_) => StepField::RecurrenceEnabled,
            FieldValue::RecurrenceLength(_) => StepField::RecurrenceLength,
            FieldValue::RecurrenceMask(_) => StepField::RecurrenceMask,
            FieldValue::RepeatEnabled(_) => StepField::RepeatEnabled,
            FieldValue::RepeatCount(_) => StepField::RepeatCount,
            FieldValue::RepeatCurve(_) => StepField::RepeatCurve,
            FieldValue::RepeatVelocityCurve(_) => StepField::RepeatVelocityCurve,
            FieldValue::RepeatVelocityEnd(_) => StepField::RepeatVelocityEnd,
        }
    }

    /// Numeric view of continuous and integer values.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Duration(v)
            | FieldValue::Velocity(v)
            | FieldValue::VelocitySpread(v)
            | FieldValue::ReleaseVelocity(v)
            | FieldValue::Pressure(v)
            | FieldValue::Timbre(v)
            | FieldValue::Pan(v)
            | FieldValue::Transpose(v)
            | FieldValue::Gain(v)
            | FieldValue::Chance(v)
            | FieldValue::RepeatCurve(v)
            | FieldValue::RepeatVelocityCurve(v)
            | FieldValue::RepeatVelocityEnd(v) => Some(v),
            FieldValue::RecurrenceLength(v) | FieldValue::RepeatCount(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Build a value for a continuous field from a float. Integers are rounded.
    pub fn from_f64(field: StepField, value: f64) -> Option<FieldValue> {
        let v = match field {
            StepField::Duration => FieldValue::Duration(value),
            StepField::Velocity => FieldValue::Velocity(value),
            StepField::VelocitySpread => FieldValue::VelocitySpread(value),
            StepField::ReleaseVelocity => FieldValue::ReleaseVelocity(value),
            StepField::Pressure => FieldValue::Pressure(value),
            StepField::Timbre => FieldValue::Timbre(value),
            StepField::Pan => FieldValue::Pan(value),
            StepField::Transpose => FieldValue::Transpose(value),
            StepField::Gain => FieldValue::Gain(value),
            StepField::Chance => FieldValue::Chance(value),
            StepField::RepeatCurve => FieldValue::RepeatCurve(value),
            StepField::RepeatVelocityCurve => FieldValue::RepeatVelocityCurve(value),
            StepField::RepeatVelocityEnd => FieldValue::RepeatVelocityEnd(value),
            StepField::RecurrenceLength => FieldValue::RecurrenceLength(round_to_i32(value)),
            StepField::RepeatCount => FieldValue::RepeatCount(round_to_i32(value)),
            _ => return None,
        };
        Some(v)
    }
}

fn round_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }
}
