//! Counting semaphores with single-waiter blocking bookkeeping

use crate::config::MAX_SEMAPHORES;
use crate::rtos::{ExecError, Executive, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Free,
    Allocated,
}

#[derive(Clone, Copy)]
pub(crate) struct Semaphore {
    pub(crate) state: SlotState,
    pub(crate) count: i32,
    pub(crate) waiter: Option<usize>,
    pub(crate) name: Option<&'static str>,
}

impl Semaphore {
    const fn vacant() -> Self {
        Self {
            state: SlotState::Free,
            count: 0,
            waiter: None,
            name: None,
        }
    }
}

/// Outcome of a successful acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A count was available; the caller holds it.
    Taken,
    /// No count left; the caller is recorded as the waiter and must yield.
    MustWait,
}

/// Fixed-capacity semaphore table.
///
/// Each semaphore records at most one waiting task. Wakeup happens solely
/// through [`post`](Self::post), which services that single waiter as soon
/// as a count becomes available.
pub struct SemaphoreTable {
    slots: [Semaphore; MAX_SEMAPHORES],
}

impl SemaphoreTable {
    pub const fn new() -> Self {
        Self {
            slots: [Semaphore::vacant(); MAX_SEMAPHORES],
        }
    }

    /// Mark every slot free.
    pub fn init(&mut self) {
        self.slots = [Semaphore::vacant(); MAX_SEMAPHORES];
    }

    /// Claim the first free slot with an initial count.
    pub fn allocate(&mut self, count: i32, name: &'static str) -> Result<usize> {
        for (handle, sem) in self.slots.iter_mut().enumerate() {
            if sem.state == SlotState::Free {
                *sem = Semaphore {
                    state: SlotState::Allocated,
                    count,
                    waiter: None,
                    name: Some(name),
                };
                return Ok(handle);
            }
        }
        Err(ExecError::TableFull)
    }

    /// Signal the semaphore.
    ///
    /// Increments the count; if that leaves a count available and a waiter
    /// is recorded, the count is consumed again on the waiter's behalf and
    /// the waiter is marked ready. Net count change in that branch is zero.
    pub fn post(&mut self, handle: usize, exec: &mut Executive) -> Result<()> {
        let sem = self.slots.get_mut(handle).ok_or(ExecError::BadHandle)?;
        if sem.state == SlotState::Free {
            return Err(ExecError::NotAllocated);
        }
        sem.count += 1;
        if sem.count >= 0 {
            if let Some(task) = sem.waiter.take() {
                sem.count -= 1;
                exec.mark_ready(task);
            }
        }
        Ok(())
    }

    /// Take a count, or record the current task as the waiter.
    ///
    /// A second task attempting to wait while one is recorded is rejected
    /// rather than queued. The count keeps decrementing under repeated
    /// blocked acquires and may go negative.
    pub fn acquire(&mut self, handle: usize, exec: &mut Executive) -> Result<Acquire> {
        let sem = self.slots.get_mut(handle).ok_or(ExecError::BadHandle)?;
        if sem.state == SlotState::Free {
            return Err(ExecError::NotAllocated);
        }
        if sem.waiter.is_some() {
            return Err(ExecError::WaiterBusy);
        }
        sem.count -= 1;
        if sem.count < 0 {
            sem.waiter = exec.current();
            if let Some(task) = sem.waiter {
                exec.mark_pending(task);
            }
            return Ok(Acquire::MustWait);
        }
        Ok(Acquire::Taken)
    }

    /// Current count, or `None` when the handle is out of range.
    pub fn count(&self, handle: usize) -> Option<i32> {
        self.slots.get(handle).map(|s| s.count)
    }

    /// Recorded waiter, flattened: `None` for no waiter or a bad handle.
    pub fn waiter(&self, handle: usize) -> Option<usize> {
        self.slots.get(handle).and_then(|s| s.waiter)
    }

    pub(crate) fn slot(&self, handle: usize) -> &Semaphore {
        &self.slots[handle]
    }
}

impl Default for SemaphoreTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtos::TaskState;

    fn noop(_ctx: usize) {}

    /// Executive with one task dispatched so `current()` is `Some(0)`.
    fn running_exec() -> Executive {
        let mut exec = Executive::new();
        exec.init();
        exec.add(noop, 0).unwrap();
        exec.switch().unwrap();
        exec
    }

    #[test]
    fn allocate_until_full() {
        let mut sems = SemaphoreTable::new();
        sems.init();
        for expected in 0..MAX_SEMAPHORES {
            assert_eq!(sems.allocate(1, "sem"), Ok(expected));
        }
        assert_eq!(sems.allocate(1, "sem"), Err(ExecError::TableFull));
    }

    #[test]
    fn acquire_then_block_then_reject() {
        let mut exec = running_exec();
        let mut sems = SemaphoreTable::new();
        sems.init();
        let h = sems.allocate(1, "uart").unwrap();

        assert_eq!(sems.acquire(h, &mut exec), Ok(Acquire::Taken));
        assert_eq!(sems.count(h), Some(0));

        assert_eq!(sems.acquire(h, &mut exec), Ok(Acquire::MustWait));
        assert_eq!(sems.waiter(h), Some(0));
        assert_eq!(exec.task_state(0), Some(TaskState::Pending));

        assert_eq!(sems.acquire(h, &mut exec), Err(ExecError::WaiterBusy));
    }

    #[test]
    fn post_with_waiter_transfers_count_and_wakes() {
        let mut exec = running_exec();
        let mut sems = SemaphoreTable::new();
        sems.init();
        let h = sems.allocate(1, "uart").unwrap();
        sems.acquire(h, &mut exec).unwrap();
        sems.acquire(h, &mut exec).unwrap();
        let before = sems.count(h).unwrap();

        sems.post(h, &mut exec).unwrap();
        assert_eq!(sems.count(h), Some(before));
        assert_eq!(sems.waiter(h), None);
        assert_eq!(exec.task_state(0), Some(TaskState::Ready));
    }

    #[test]
    fn post_without_waiter_increments() {
        let mut exec = running_exec();
        let mut sems = SemaphoreTable::new();
        sems.init();
        let h = sems.allocate(0, "adc").unwrap();
        sems.post(h, &mut exec).unwrap();
        assert_eq!(sems.count(h), Some(1));
    }

    #[test]
    fn count_goes_negative_under_repeated_blocked_acquires() {
        let mut exec = Executive::new();
        exec.init();
        let mut sems = SemaphoreTable::new();
        sems.init();
        let h = sems.allocate(0, "bus").unwrap();

        // No current task: blocked status is reported but no waiter is
        // recorded, so the count keeps sinking.
        assert_eq!(sems.acquire(h, &mut exec), Ok(Acquire::MustWait));
        assert_eq!(sems.acquire(h, &mut exec), Ok(Acquire::MustWait));
        assert_eq!(sems.count(h), Some(-2));
        assert_eq!(sems.waiter(h), None);
    }

    #[test]
    fn bad_handles_are_rejected_without_mutation() {
        let mut exec = running_exec();
        let mut sems = SemaphoreTable::new();
        sems.init();
        let h = sems.allocate(3, "ok").unwrap();

        assert_eq!(
            sems.post(MAX_SEMAPHORES, &mut exec),
            Err(ExecError::BadHandle)
        );
        assert_eq!(
            sems.acquire(MAX_SEMAPHORES, &mut exec),
            Err(ExecError::BadHandle)
        );
        assert_eq!(sems.post(h + 1, &mut exec), Err(ExecError::NotAllocated));
        assert_eq!(sems.acquire(h + 1, &mut exec), Err(ExecError::NotAllocated));
        assert_eq!(sems.count(h), Some(3));
    }
}
