//! Per-step state types.

pub mod field;
pub mod occurrence;
pub mod step;

pub use field::{FieldValue, StepField};
pub use occurrence::Occurrence;
pub use step::{StepAttributes, StepState};
