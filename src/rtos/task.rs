//! Task record and state tags

use ufmt::derive::uDebug;

/// Task entry point. Receives the opaque context word stored at `add` time
/// and must run to completion; the executive never suspends it.
pub type TaskFn = fn(usize);

/// Declared task state.
///
/// The tags are advisory bookkeeping: the dispatcher selects tasks by slot
/// occupancy alone, and a task flagged `Pending` is expected to cooperate by
/// returning early when it cannot make progress.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Ready,
    Pending,
    Running,
    Inactive,
    Interrupted,
}

#[derive(Clone, Copy)]
pub(crate) struct Task {
    pub(crate) entry: Option<TaskFn>,
    pub(crate) ctx: usize,
    pub(crate) state: TaskState,
}

impl Task {
    pub(crate) const fn vacant() -> Self {
        Self {
            entry: None,
            ctx: 0,
            state: TaskState::Inactive,
        }
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.entry.is_some()
    }
}
