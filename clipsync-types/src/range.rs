//! Numeric domains of the step attributes.

/// Closed float interval a field is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp into the domain. NaN collapses to 0.0 clamped into the domain:
    /// centre for pan, timbre and transpose, `min` for unit and duration.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0_f64.clamp(self.min, self.max);
        }
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// velocity, velocity spread, release velocity, pressure, gain, chance
pub const UNIT: Domain = Domain::new(0.0, 1.0);
/// timbre, pan, repeat curves, repeat velocity end
pub const BIPOLAR: Domain = Domain::new(-1.0, 1.0);
/// Semitones.
pub const TRANSPOSE: Domain = Domain::new(-24.0, 24.0);
/// Beats.
pub const DURATION: Domain = Domain::new(0.0, f64::INFINITY);

pub const RECURRENCE_LENGTH_MIN: u8 = 1;
pub const RECURRENCE_LENGTH_MAX: u8 = 8;

pub const REPEAT_COUNT_MIN: i32 = -127;
pub const REPEAT_COUNT_MAX: i32 = 127;

pub fn clamp_recurrence_length(length: i32) -> u8 {
    length.clamp(RECURRENCE_LENGTH_MIN as i32, RECURRENCE_LENGTH_MAX as i32) as u8
}

pub fn clamp_repeat_count(count: i32) -> i32 {
    count.clamp(REPEAT_COUNT_MIN, REPEAT_COUNT_MAX)
}
