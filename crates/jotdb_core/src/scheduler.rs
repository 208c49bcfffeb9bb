//! Cooperative turn scheduler.
//!
//! The store is single-threaded and cooperative: one operation runs to
//! completion before the next observes state. Work that the original
//! API shape defers "to the next tick" - flush cycles, and the
//! notification half of the `*_with` call variants - is queued here as
//! explicit turns that [`crate::Store::tick`] and
//! [`crate::Store::run_pending`] drain.
//!
//! Deferred variants never defer the computation itself, only the
//! delivery of its already-computed result.

use std::collections::VecDeque;

/// One scheduled turn.
pub(crate) enum Task {
    /// Run a log flush cycle.
    Flush,
    /// Deliver a result to a caller's continuation.
    Notify(Box<dyn FnOnce()>),
}

/// FIFO queue of pending turns.
///
/// At most one `Flush` turn is pending at a time: scheduling a flush
/// while one is already queued is a no-op, which is what keeps repeated
/// enqueues from piling up redundant cycles.
#[derive(Default)]
pub(crate) struct Scheduler {
    queue: VecDeque<Task>,
    flush_scheduled: bool,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedules a flush turn, idempotently.
    pub(crate) fn schedule_flush(&mut self) {
        if !self.flush_scheduled {
            self.flush_scheduled = true;
            self.queue.push_back(Task::Flush);
        }
    }

    /// Schedules delivery of an already-computed result.
    pub(crate) fn defer(&mut self, notify: impl FnOnce() + 'static) {
        self.queue.push_back(Task::Notify(Box::new(notify)));
    }

    /// Takes the next turn off the queue.
    pub(crate) fn pop(&mut self) -> Option<Task> {
        let task = self.queue.pop_front();
        if matches!(task, Some(Task::Flush)) {
            self.flush_scheduled = false;
        }
        task
    }

    /// Returns the number of queued turns.
    pub(crate) fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.queue.len())
            .field("flush_scheduled", &self.flush_scheduled)
            .finish()
    }
}
