//! Timed work queue for the engine. Nothing here sleeps; the owner polls.

use std::time::Instant;

use clipsync_types::{StepAttributes, StepPosition};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Task {
    /// Push every step under edit back to the host, then re-arm.
    Reassert,
    /// Second phase of a whole-step write.
    SecondaryWrite {
        position: StepPosition,
        attributes: StepAttributes,
    },
}

struct Scheduled {
    due: Instant,
    task: Task,
}

/// Tasks ordered by due time; equal due times keep insertion order.
#[derive(Default)]
pub(crate) struct TaskQueue {
    tasks: Vec<Scheduled>,
}

impl TaskQueue {
    pub(crate) fn schedule(&mut self, due: Instant, task: Task) {
        let insert_pos = self.tasks.partition_point(|t| t.due <= due);
        self.tasks.insert(insert_pos, Scheduled { due, task });
    }

    /// Remove and return the earliest task due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<Task> {
        if self.tasks.first().is_some_and(|t| t.due <= now) {
            Some(self.tasks.remove(0).task)
        } else {
            None
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.tasks.first().map(|t| t.due)
    }

    /// Drop pending second-phase writes whose position matches. Returns how
    /// many were dropped.
    pub(crate) fn cancel_secondary(&mut self, matches: impl Fn(StepPosition) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| match t.task {
            Task::SecondaryWrite { position, .. } => !matches(position),
            Task::Reassert => true,
        });
        before - self.tasks.len()
    }

    /// Point pending second-phase writes for `from` at `to`, keeping due times.
    pub(crate) fn retarget_secondary(&mut self, from: StepPosition, to: StepPosition) {
        for t in &mut self.tasks {
            if let Task::SecondaryWrite { position, .. } = &mut t.task {
                if *position == from {
                    *position = to;
                }
            }
        }
    }

    pub(crate) fn has_reassert(&self) -> bool {
        self.tasks.iter().any(|t| t.task == Task::Reassert)
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pops_in_due_order() {
        let t0 = Instant::now();
        let mut q = TaskQueue::default();
        let late = Task::SecondaryWrite {
            position: StepPosition::new(0, 0, 1),
            attributes: StepAttributes::EMPTY,
        };
        q.schedule(t0 + Duration::from_millis(200), late.clone());
        q.schedule(t0 + Duration::from_millis(100), Task::Reassert);

        assert_eq!(q.next_deadline(), Some(t0 + Duration::from_millis(100)));
        assert_eq!(q.pop_due(t0), None);
        assert_eq!(q.pop_due(t0 + Duration::from_millis(150)), Some(Task::Reassert));
        assert_eq!(q.pop_due(t0 + Duration::from_millis(150)), None);
        assert_eq!(q.pop_due(t0 + Duration::from_millis(200)), Some(late));
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let due = Instant::now();
        let mut q = TaskQueue::default();
        let a = Task::SecondaryWrite {
            position: StepPosition::new(0, 0, 1),
            attributes: StepAttributes::EMPTY,
        };
        let b = Task::SecondaryWrite {
            position: StepPosition::new(0, 0, 2),
            attributes: StepAttributes::EMPTY,
        };
        q.schedule(due, a.clone());
        q.schedule(due, b.clone());
        assert!(!q.has_reassert());
        assert_eq!(q.pop_due(due), Some(a));
        assert_eq!(q.pop_due(due), Some(b));
    }

    #[test]
    fn cancel_and_retarget_only_touch_matching_writes() {
        let due = Instant::now();
        let mut q = TaskQueue::default();
        let a = StepPosition::new(0, 0, 1);
        let b = StepPosition::new(0, 0, 2);
        let write = |position| Task::SecondaryWrite {
            position,
            attributes: StepAttributes::EMPTY,
        };
        q.schedule(due, write(a));
        q.schedule(due, Task::Reassert);
        q.schedule(due, write(b));

        assert_eq!(q.cancel_secondary(|p| p == a), 1);
        assert_eq!(q.len(), 2);

        let c = b.with_row(9);
        q.retarget_secondary(b, c);
        assert_eq!(q.pop_due(due), Some(Task::Reassert));
        assert_eq!(q.pop_due(due), Some(write(c)));
    }
}
