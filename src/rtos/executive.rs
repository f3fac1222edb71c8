//! Task table and round-robin dispatcher

use crate::config::MAX_TASKS;
use crate::rtos::task::{Task, TaskFn, TaskState};
use crate::rtos::{ExecError, Result};

/// State transition reported through the trace hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Ready(usize),
    Pending(usize),
    Killed(usize),
}

/// Diagnostic hook invoked on every reported transition.
pub type TraceFn = fn(TraceEvent);

/// Fixed-capacity task table with cooperative round-robin dispatch.
///
/// Tasks run to completion: `switch` calls the selected entry function
/// synchronously and only returns when it does. "Blocking" on a semaphore is
/// bookkeeping on the state tag, never an actual suspension.
pub struct Executive {
    tasks: [Task; MAX_TASKS],
    current: Option<usize>,
    trace: Option<TraceFn>,
}

impl Executive {
    pub const fn new() -> Self {
        Self {
            tasks: [Task::vacant(); MAX_TASKS],
            current: None,
            trace: None,
        }
    }

    /// Reset the dispatch marker. Table slots are left untouched.
    pub fn init(&mut self) {
        self.current = None;
    }

    /// Register the diagnostic trace hook.
    pub fn set_trace(&mut self, trace: TraceFn) {
        self.trace = Some(trace);
    }

    /// Claim the first free slot for `entry` and mark it ready.
    pub fn add(&mut self, entry: TaskFn, ctx: usize) -> Result<usize> {
        for id in 0..MAX_TASKS {
            if !self.tasks[id].is_occupied() {
                self.tasks[id] = Task {
                    entry: Some(entry),
                    ctx,
                    state: TaskState::Ready,
                };
                self.mark_ready(id);
                return Ok(id);
            }
        }
        Err(ExecError::TableFull)
    }

    /// Return the slot to free, whatever its prior state.
    ///
    /// `id` must have been returned by [`add`](Self::add); an out-of-range
    /// id panics.
    pub fn kill(&mut self, id: usize) {
        self.tasks[id] = Task::vacant();
        self.emit(TraceEvent::Killed(id));
    }

    /// Slot index of the task presently dispatched, if any.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Declared state of a slot, or `None` when out of range.
    pub fn task_state(&self, id: usize) -> Option<TaskState> {
        self.tasks.get(id).map(|t| t.state)
    }

    pub fn is_occupied(&self, id: usize) -> bool {
        self.tasks.get(id).map_or(false, Task::is_occupied)
    }

    /// Advance to the next occupied slot and run its entry function.
    ///
    /// The scan starts just after the current task and wraps; the state tag
    /// is not consulted, so ready and pending tasks are dispatched alike.
    /// When no slot is occupied the dispatch marker stays vacated.
    pub fn switch(&mut self) -> Result<()> {
        self.current = self.next_occupied();
        let id = self.current.ok_or(ExecError::NoRunnable)?;
        let Task { entry, ctx, .. } = self.tasks[id];
        if let Some(entry) = entry {
            entry(ctx);
        }
        Ok(())
    }

    /// Flag a task pending and report the transition.
    ///
    /// Advisory: the dispatcher keeps scheduling the slot; the task itself
    /// is expected to check its acquire status and yield.
    pub fn mark_pending(&mut self, id: usize) {
        self.tasks[id].state = TaskState::Pending;
        self.emit(TraceEvent::Pending(id));
    }

    /// Flag a task ready and report the transition.
    pub fn mark_ready(&mut self, id: usize) {
        self.tasks[id].state = TaskState::Ready;
        self.emit(TraceEvent::Ready(id));
    }

    pub(crate) fn slot(&self, id: usize) -> &Task {
        &self.tasks[id]
    }

    fn emit(&self, event: TraceEvent) {
        if let Some(trace) = self.trace {
            trace(event);
        }
    }

    fn next_occupied(&self) -> Option<usize> {
        let mut id = self.current.unwrap_or(MAX_TASKS - 1);
        for _ in 0..MAX_TASKS {
            id = (id + 1) % MAX_TASKS;
            if self.tasks[id].is_occupied() {
                return Some(id);
            }
        }
        None
    }
}

impl Default for Executive {
    fn default() -> Self {
        Self::new()
    }
}
