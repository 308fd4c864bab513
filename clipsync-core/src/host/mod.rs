//! Host clip adapter: the boundary to the live clip document.
//!
//! `HostClip` captures what the engine *means* to do to the host clip (write a
//! field, create a step, quantize) independently of how a particular host
//! does it. Hosts report their own changes back as `HostEvent`s on the channel
//! handed to `subscribe`.

mod test_host;

pub use test_host::{HostOp, TestHost};

use crossbeam_channel::Sender;

use clipsync_types::{FieldValue, StepAttributes, StepPosition};

use crate::error::HostResult;

/// Notification pushed by the host when its document changes.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Step {
        position: StepPosition,
        attributes: StepAttributes,
    },
    Clip(ClipEvent),
}

/// A single clip-level value as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipEvent {
    Exists(bool),
    PlayingColumn(Option<usize>),
    PlayStart(f64),
    PlayEnd(f64),
    LoopStart(f64),
    LoopLength(f64),
    LoopEnabled(bool),
    Shuffle(f64),
    Accent(f64),
    Pinned(bool),
    Color([f32; 3]),
    CanHoldNoteData(bool),
}

/// Semantic-level host clip operations.
///
/// `write_step` must reach the host before any secondary-field write for a
/// step that did not exist yet; hosts silently ignore secondary writes to
/// absent steps.
pub trait HostClip: Send {
    /// Register the channel the host pushes its own changes to.
    fn subscribe(&self, events: Sender<HostEvent>);

    /// Authoritative host-side content of a step.
    fn read_step(&self, position: StepPosition) -> HostResult<StepAttributes>;

    /// Write one attribute of an existing step.
    fn write_field(&self, position: StepPosition, value: FieldValue) -> HostResult;

    /// Create (or overwrite) a step from its primary pair.
    fn write_step(&self, position: StepPosition, velocity: f64, duration: f64) -> HostResult;

    /// Overwrite every attribute of a step.
    fn write_full_step(&self, position: StepPosition, attributes: &StepAttributes) -> HostResult;

    fn toggle_step(&self, position: StepPosition, velocity: f64) -> HostResult;

    fn clear_step(&self, position: StepPosition) -> HostResult;

    fn clear_row(&self, lane: usize, row: usize) -> HostResult;

    fn clear_lane(&self, lane: usize) -> HostResult;

    fn clear_all(&self) -> HostResult;

    fn move_step_pitch(&self, position: StepPosition, new_row: usize) -> HostResult;

    /// Duplicate the clip (clip slot level).
    fn duplicate(&self) -> HostResult;

    /// Double the clip's content inside the clip.
    fn duplicate_content(&self) -> HostResult;

    fn quantize(&self, amount: f64) -> HostResult;

    fn transpose(&self, semitones: i32) -> HostResult;

    fn scroll_steps_page_backwards(&self) -> HostResult;

    fn scroll_steps_page_forward(&self) -> HostResult;

    fn set_step_length(&self, beats: f64) -> HostResult;

    fn set_play_start(&self, beats: f64) -> HostResult;

    fn set_play_end(&self, beats: f64) -> HostResult;

    fn set_loop_start(&self, beats: f64) -> HostResult;

    fn set_loop_length(&self, beats: f64) -> HostResult;

    fn set_loop_enabled(&self, enabled: bool) -> HostResult;

    fn set_shuffle(&self, amount: f64) -> HostResult;

    fn set_accent(&self, amount: f64) -> HostResult;

    fn set_pinned(&self, pinned: bool) -> HostResult;

    fn set_color(&self, rgb: [f32; 3]) -> HostResult;

    /// Start or stop reporting clip-level values.
    fn set_observing(&self, enabled: bool) -> HostResult;

    /// Whether the clip's track accepts note data at all.
    fn can_hold_note_data(&self) -> bool;
}
