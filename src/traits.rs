//! Host runtime seams.
//!
//! The map core never blocks and never spawns threads. Everything deferred
//! goes through a [`Scheduler`] provided by the host: a browser-style
//! frame/timer loop, a game loop, or the deterministic
//! [`EventLoop`](crate::scheduler::EventLoop) used in tests.

use std::time::Duration;

/// Identity of a scheduled frame callback or timer.
///
/// Ids are never reused, so a stale id can be compared against the current
/// one to detect a superseded task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

pub type Task = Box<dyn FnOnce()>;

/// Single-threaded deferred execution.
pub trait Scheduler {
    /// Runs `task` at the next rendering frame.
    fn request_frame(&self, task: Task) -> TaskId;

    /// Cancels a frame task. Unknown or already-run ids are ignored.
    fn cancel_frame(&self, id: TaskId);

    /// Runs `task` once `delay` has elapsed.
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancels a timer. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TaskId);
}
