//! Executive core: task table, semaphores, software timers
pub mod executive;
pub mod monitor;
pub mod semaphore;
pub mod swtimer;
pub mod task;

pub use executive::{Executive, TraceEvent, TraceFn};
pub use semaphore::{Acquire, SemaphoreTable};
pub use swtimer::{tick_handler, TickSource, TimerTable, TICK_SOURCE};
pub use task::{TaskFn, TaskState};

use ufmt::derive::uDebug;

/// Errors reported by the table-bounded kernel operations.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// No free slot left in the table
    TableFull,
    /// Handle outside the table's declared range
    BadHandle,
    /// Handle refers to a slot that is not allocated
    NotAllocated,
    /// A task is already waiting on the semaphore
    WaiterBusy,
    /// A timer cannot be armed with a zero count
    ZeroCount,
    /// No occupied task slot to dispatch
    NoRunnable,
}

impl ExecError {
    /// Diagnostic message for the console.
    pub fn message(&self) -> &'static str {
        match self {
            ExecError::TableFull => "out of table slots",
            ExecError::BadHandle => "handle out of range",
            ExecError::NotAllocated => "slot not allocated",
            ExecError::WaiterBusy => "a task is already waiting",
            ExecError::ZeroCount => "count must be non-zero",
            ExecError::NoRunnable => "no task to run",
        }
    }
}

impl ufmt::uDisplay for ExecError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(self.message())
    }
}

pub type Result<T> = core::result::Result<T, ExecError>;
