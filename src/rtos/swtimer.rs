//! Software countdown timers and the tick accumulator

use crate::config::NUM_SWTIMERS;
use crate::platform;
use crate::rtos::{ExecError, Result};
use core::sync::atomic::{AtomicU32, Ordering};

/// Timer callback. Receives the context word stored in the timer record and
/// runs inside the service call, so it must complete quickly.
pub type TimerFn = fn(usize);

#[derive(Clone, Copy)]
pub(crate) struct Timer {
    pub(crate) allocated: bool,
    pub(crate) counting: bool,
    pub(crate) count: u32,
    pub(crate) ctx: usize,
    pub(crate) callback: Option<TimerFn>,
    pub(crate) name: Option<&'static str>,
}

impl Timer {
    const fn vacant() -> Self {
        Self {
            allocated: false,
            counting: false,
            count: 0,
            ctx: 0,
            callback: None,
            name: None,
        }
    }
}

/// Tick accumulator shared with interrupt context.
///
/// The ISR side does a single bounded increment; the service side drains
/// the counter under [`platform::interrupt_free`] so no increment is lost
/// between the read and the clear.
pub struct TickSource {
    accum: AtomicU32,
}

impl TickSource {
    pub const fn new() -> Self {
        Self {
            accum: AtomicU32::new(0),
        }
    }

    /// Record one elapsed tick. Safe to call from interrupt context.
    #[inline]
    pub fn record(&self) {
        self.accum.fetch_add(1, Ordering::Relaxed);
    }

    /// Take all accumulated ticks, leaving the counter at zero.
    pub fn drain(&self) -> u32 {
        platform::interrupt_free(|| {
            let ticks = self.accum.load(Ordering::Relaxed);
            self.accum.store(0, Ordering::Relaxed);
            ticks
        })
    }

    /// Accumulated ticks not yet drained.
    pub fn pending(&self) -> u32 {
        self.accum.load(Ordering::Relaxed)
    }
}

/// Process-wide tick source fed by the hardware tick interrupt.
pub static TICK_SOURCE: TickSource = TickSource::new();

/// Tick interrupt entry point: one increment, nothing else.
#[inline]
pub fn tick_handler() {
    TICK_SOURCE.record();
}

/// Fixed-capacity table of one-shot countdown timers.
pub struct TimerTable {
    timers: [Timer; NUM_SWTIMERS],
}

impl TimerTable {
    pub const fn new() -> Self {
        Self {
            timers: [Timer::vacant(); NUM_SWTIMERS],
        }
    }

    /// Clear every record.
    pub fn init(&mut self) {
        self.timers = [Timer::vacant(); NUM_SWTIMERS];
    }

    /// Claim the first free slot. The timer is created idle with a zero
    /// countdown and must be armed with [`set_count`](Self::set_count).
    pub fn allocate(&mut self, callback: TimerFn, ctx: usize, name: &'static str) -> Result<usize> {
        for (handle, timer) in self.timers.iter_mut().enumerate() {
            if !timer.allocated {
                *timer = Timer {
                    allocated: true,
                    counting: false,
                    count: 0,
                    ctx,
                    callback: Some(callback),
                    name: Some(name),
                };
                return Ok(handle);
            }
        }
        Err(ExecError::TableFull)
    }

    /// Discard the record, returning the slot to free.
    pub fn free(&mut self, handle: usize) -> Result<()> {
        let timer = self.timers.get_mut(handle).ok_or(ExecError::BadHandle)?;
        if !timer.allocated {
            return Err(ExecError::NotAllocated);
        }
        *timer = Timer::vacant();
        Ok(())
    }

    /// Arm the timer to fire once `count` ticks have been serviced.
    ///
    /// Arming sets the counting flag and leaves the allocation flag alone,
    /// so an armed slot cannot be re-claimed by `allocate`.
    pub fn set_count(&mut self, handle: usize, count: u32) -> Result<()> {
        if count == 0 {
            return Err(ExecError::ZeroCount);
        }
        let timer = self.timers.get_mut(handle).ok_or(ExecError::BadHandle)?;
        if !timer.allocated {
            return Err(ExecError::NotAllocated);
        }
        timer.count = count;
        timer.counting = true;
        Ok(())
    }

    /// Replace the context word handed to the callback.
    pub fn set_data(&mut self, handle: usize, ctx: usize) -> Result<()> {
        let timer = self.timers.get_mut(handle).ok_or(ExecError::BadHandle)?;
        if !timer.allocated {
            return Err(ExecError::NotAllocated);
        }
        timer.ctx = ctx;
        Ok(())
    }

    /// Service the table: drain the tick source and advance every armed
    /// timer by the drained amount.
    ///
    /// A timer whose countdown is exhausted by the drain fires exactly once;
    /// it stays counting but will not fire again until re-armed through
    /// [`set_count`](Self::set_count).
    pub fn tick(&mut self, source: &TickSource) {
        let ticks = source.drain();
        for timer in self.timers.iter_mut() {
            if !timer.counting || timer.count == 0 {
                continue;
            }
            if timer.count > ticks {
                timer.count -= ticks;
            } else {
                timer.count = 0;
                if let Some(callback) = timer.callback {
                    callback(timer.ctx);
                }
            }
        }
    }

    /// Remaining countdown, or `None` when the handle is out of range.
    pub fn count(&self, handle: usize) -> Option<u32> {
        self.timers.get(handle).map(|t| t.count)
    }

    pub fn is_allocated(&self, handle: usize) -> bool {
        self.timers.get(handle).map_or(false, |t| t.allocated)
    }

    pub fn is_counting(&self, handle: usize) -> bool {
        self.timers.get(handle).map_or(false, |t| t.counting)
    }

    pub(crate) fn slot(&self, handle: usize) -> &Timer {
        &self.timers[handle]
    }
}

impl Default for TimerTable {
    fn default() -> Self {
        Self::new()
    }
}
