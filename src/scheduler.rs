//! Deterministic frame and timer loop.
//!
//! The host drives it: `run_frame` once per rendering frame, `advance` as
//! wall time passes. Tasks never run re-entrantly while the loop's own state
//! is borrowed, so a task may freely schedule or cancel other tasks.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::traits::{Scheduler, Task, TaskId};

#[derive(Default)]
struct LoopState {
    now: Duration,
    next_id: u64,
    frames: BTreeMap<TaskId, Task>,
    /// Keyed by (due time, id) so equal deadlines fire in scheduling order.
    timers: BTreeMap<(Duration, TaskId), Task>,
    timer_due: BTreeMap<TaskId, Duration>,
}

impl LoopState {
    fn next_id(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }
}

/// Cloneable handle to a single-threaded event loop.
#[derive(Clone, Default)]
pub struct EventLoop {
    state: Rc<RefCell<LoopState>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the loop was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Runs every frame task queued before this call.
    ///
    /// Tasks requested while the frame runs wait for the next frame.
    /// Returns the number of tasks run.
    pub fn run_frame(&self) -> usize {
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        let count = frames.len();
        for (id, task) in frames {
            trace!(task = id.0, "running frame task");
            task();
        }
        count
    }

    /// Moves the clock forward by `elapsed`, firing due timers in deadline
    /// order. Returns the number of timers fired.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let target = self.now() + elapsed;
        let mut fired = 0;

        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = match state.timers.keys().next() {
                    Some(&(due, _)) if due <= target => due,
                    _ => break,
                };
                state.now = due;
                state.timers.pop_first().map(|((_, id), task)| {
                    state.timer_due.remove(&id);
                    (id, task)
                })
            };

            if let Some((id, task)) = next {
                trace!(task = id.0, "firing timer");
                task();
                fired += 1;
            }
        }

        self.state.borrow_mut().now = target;
        fired
    }
}

impl Scheduler for EventLoop {
    fn request_frame(&self, task: Task) -> TaskId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.frames.insert(id, task);
        id
    }

    fn cancel_frame(&self, id: TaskId) {
        self.state.borrow_mut().frames.remove(&id);
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let due = state.now + delay;
        state.timers.insert((due, id), task);
        state.timer_due.insert(id, due);
        id
    }

    fn clear_timeout(&self, id: TaskId) {
        let mut state = self.state.borrow_mut();
        if let Some(due) = state.timer_due.remove(&id) {
            state.timers.remove(&(due, id));
        }
    }
}
