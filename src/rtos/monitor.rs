//! Table dump diagnostics for the shell console
//!
//! One line per slot, rendered over any [`ufmt::uWrite`] sink.

use crate::config::{MAX_SEMAPHORES, MAX_TASKS, NUM_SWTIMERS};
use crate::rtos::semaphore::SlotState;
use crate::rtos::{Executive, SemaphoreTable, TimerTable};
use ufmt::{uwrite, uWrite};

pub fn dump_tasks<W: uWrite>(w: &mut W, exec: &Executive) -> Result<(), W::Error> {
    for id in 0..MAX_TASKS {
        let task = exec.slot(id);
        if task.is_occupied() {
            uwrite!(w, "{}: {:?} ctx={}\r\n", id, task.state, task.ctx)?;
        } else {
            uwrite!(w, "{}: free\r\n", id)?;
        }
    }
    Ok(())
}

pub fn dump_semaphores<W: uWrite>(w: &mut W, sems: &SemaphoreTable) -> Result<(), W::Error> {
    for handle in 0..MAX_SEMAPHORES {
        let sem = sems.slot(handle);
        if sem.state == SlotState::Allocated {
            let waiter = sem.waiter.map(|task| task as i32).unwrap_or(-1);
            uwrite!(
                w,
                "{}: count={} waiter={} {}\r\n",
                handle,
                sem.count,
                waiter,
                sem.name.unwrap_or("")
            )?;
        } else {
            uwrite!(w, "{}: free\r\n", handle)?;
        }
    }
    Ok(())
}

pub fn dump_timers<W: uWrite>(w: &mut W, timers: &TimerTable) -> Result<(), W::Error> {
    for handle in 0..NUM_SWTIMERS {
        let timer = timers.slot(handle);
        uwrite!(w, "{}: {}", handle, timer.count)?;
        if timer.allocated {
            uwrite!(w, " ALLOCATED")?;
        }
        if timer.counting {
            uwrite!(w, " COUNTING")?;
        }
        uwrite!(w, " {}\r\n", timer.name.unwrap_or(""))?;
    }
    Ok(())
}
