//! Clip-level operations: paging, step length, clip edits and parameters.

use clipsync_types::range::{DURATION, UNIT};

use super::{report, ClipSync};
use crate::clip::ClipParams;

impl ClipSync {
    // --- paging ---

    pub fn edit_page(&self) -> usize {
        self.edit_page
    }

    /// First absolute column shown by the current page.
    pub fn column_offset(&self) -> usize {
        self.edit_page * self.dims().columns
    }

    pub fn can_scroll_steps_backwards(&self) -> bool {
        self.edit_page > 0
    }

    pub fn can_scroll_steps_forwards(&self) -> bool {
        true
    }

    pub fn scroll_steps_page_backwards(&mut self) {
        if self.edit_page == 0 {
            return;
        }
        self.edit_page -= 1;
        report(
            "scroll_steps_page_backwards",
            self.host.scroll_steps_page_backwards(),
        );
    }

    pub fn scroll_steps_page_forward(&mut self) {
        self.edit_page += 1;
        report(
            "scroll_steps_page_forward",
            self.host.scroll_steps_page_forward(),
        );
    }

    // --- step length ---

    /// Beats per column.
    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    pub fn set_step_length(&mut self, beats: f64) {
        if !(beats.is_finite() && beats > 0.0) {
            log::debug!(target: "sync", "step length {} rejected", beats);
            return;
        }
        self.step_length = beats;
        report("set_step_length", self.host.set_step_length(beats));
    }

    // --- clip edits ---

    pub fn duplicate(&self) {
        report("duplicate", self.host.duplicate());
    }

    pub fn duplicate_content(&self) {
        report("duplicate_content", self.host.duplicate_content());
    }

    /// Quantize by `amount`, a strength in (0, 1].
    pub fn quantize(&self, amount: f64) {
        if !(amount > 0.0 && amount <= 1.0) {
            log::debug!(target: "sync", "quantize amount {} rejected", amount);
            return;
        }
        report("quantize", self.host.quantize(amount));
    }

    /// Transpose every note. Does nothing on tracks without note data.
    pub fn transpose(&self, semitones: i32) {
        if !self.host.can_hold_note_data() {
            log::debug!(target: "sync", "transpose skipped, track holds no note data");
            return;
        }
        report("transpose", self.host.transpose(semitones));
    }

    // --- clip parameters ---

    /// Last clip values reported by the host.
    pub fn clip(&self) -> &ClipParams {
        &self.clip
    }

    pub fn can_hold_note_data(&self) -> bool {
        self.host.can_hold_note_data()
    }

    pub fn set_play_start(&self, beats: f64) {
        report("set_play_start", self.host.set_play_start(DURATION.clamp(beats)));
    }

    pub fn set_play_end(&self, beats: f64) {
        report("set_play_end", self.host.set_play_end(DURATION.clamp(beats)));
    }

    pub fn set_loop_start(&self, beats: f64) {
        report("set_loop_start", self.host.set_loop_start(DURATION.clamp(beats)));
    }

    pub fn set_loop_length(&self, beats: f64) {
        report("set_loop_length", self.host.set_loop_length(DURATION.clamp(beats)));
    }

    pub fn set_loop_enabled(&self, enabled: bool) {
        report("set_loop_enabled", self.host.set_loop_enabled(enabled));
    }

    pub fn set_shuffle(&self, amount: f64) {
        report("set_shuffle", self.host.set_shuffle(UNIT.clamp(amount)));
    }

    pub fn set_accent(&self, amount: f64) {
        report("set_accent", self.host.set_accent(UNIT.clamp(amount)));
    }

    pub fn set_pinned(&self, pinned: bool) {
        report("set_pinned", self.host.set_pinned(pinned));
    }

    pub fn set_color(&self, rgb: [f32; 3]) {
        let rgb = rgb.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) });
        report("set_color", self.host.set_color(rgb));
    }

    /// Tell the host whether clip parameter changes should be reported.
    pub fn set_observing(&self, enabled: bool) {
        report("set_observing", self.host.set_observing(enabled));
    }
}
