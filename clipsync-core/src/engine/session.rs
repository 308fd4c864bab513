//! Edit sessions: local authority over a set of steps.
//!
//! While a position is under edit, host notifications for it are ignored and
//! the local copy is pushed back in full on every re-assertion tick. Ending
//! the session pushes once more and hands authority back to the host.

use clipsync_types::StepPosition;

use super::schedule::Task;
use super::{report, ClipSync};

impl ClipSync {
    /// Begin editing `positions`. An open session is closed first, with a
    /// final push of its steps. Positions outside the grid are skipped.
    ///
    /// Host notifications already queued are applied first, under the
    /// authority that held when they were sent.
    pub fn start_edit(&mut self, positions: impl IntoIterator<Item = StepPosition>) {
        self.drain_host_events();
        if !self.editing.is_empty() {
            self.push_edited();
            self.editing.clear();
        }
        let dims = self.dims();
        for position in positions {
            if dims.contains(position) {
                self.editing.insert(position);
            } else {
                log::warn!(target: "sync", "edit of {} outside grid {} skipped", position, dims);
            }
        }
        if self.editing.is_empty() {
            return;
        }
        log::debug!(target: "sync", "edit session started on {} steps", self.editing.len());
        if !self.tasks.has_reassert() {
            let due = self.clock.now() + self.settings.reassert_interval;
            self.tasks.schedule(due, Task::Reassert);
        }
    }

    /// Push the edited steps one last time and release them.
    pub fn stop_edit(&mut self) {
        if self.editing.is_empty() {
            return;
        }
        self.drain_host_events();
        self.push_edited();
        self.editing.clear();
        log::debug!(target: "sync", "edit session stopped");
    }

    pub fn is_editing(&self, position: StepPosition) -> bool {
        self.editing.contains(&position)
    }

    pub fn has_edit_session(&self) -> bool {
        !self.editing.is_empty()
    }

    pub fn editing_positions(&self) -> Vec<StepPosition> {
        self.editing.iter().copied().collect()
    }

    /// Re-assertion tick. Stops re-arming once no session is open.
    pub(super) fn reassert(&mut self, now: std::time::Instant) {
        if self.editing.is_empty() {
            return;
        }
        self.push_edited();
        self.tasks
            .schedule(now + self.settings.reassert_interval, Task::Reassert);
    }

    fn push_edited(&self) {
        for &position in &self.editing {
            let step = self.grid.get(position);
            report("write_full_step", self.host.write_full_step(position, &step));
        }
    }
}
