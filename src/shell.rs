//! Serial command monitor
//!
//! Line-oriented console for poking at the executive from a terminal:
//! dump the tables, inject ticks, service the timers, dispatch the next
//! task. Transport-generic over the embedded-hal serial traits so the
//! firmware hands it a USART and the tests hand it a mock.

use crate::config::SHELL_LINE_LEN;
use crate::rtos::{monitor, Executive, SemaphoreTable, TickSource, TimerTable};
use embedded_hal::serial;
use ufmt::{uwrite, uWrite};

/// Adapter: `ufmt` output over a blocking serial write.
struct Port<'a, S>(&'a mut S);

impl<'a, S> uWrite for Port<'a, S>
where
    S: serial::Write<u8>,
{
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            nb::block!(self.0.write(byte))?;
        }
        Ok(())
    }
}

pub struct Shell<S> {
    serial: S,
    line: [u8; SHELL_LINE_LEN],
    len: usize,
}

impl<S> Shell<S>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            line: [0; SHELL_LINE_LEN],
            len: 0,
        }
    }

    /// Hand the transport back, e.g. to verify a mock.
    pub fn into_serial(self) -> S {
        self.serial
    }

    /// Drain pending input; on a completed line, run the command and return.
    ///
    /// Input beyond the line capacity is dropped. A transport error or an
    /// empty receive buffer ends the poll; the shell picks up where it left
    /// off on the next call.
    pub fn poll(
        &mut self,
        exec: &mut Executive,
        sems: &mut SemaphoreTable,
        timers: &mut TimerTable,
        ticks: &TickSource,
    ) {
        loop {
            match self.serial.read() {
                Ok(b'\r') | Ok(b'\n') => {
                    if self.len > 0 {
                        self.dispatch(exec, sems, timers, ticks);
                        self.len = 0;
                        return;
                    }
                }
                Ok(byte) => {
                    if self.len < self.line.len() {
                        self.line[self.len] = byte;
                        self.len += 1;
                    }
                }
                Err(_) => return,
            }
        }
    }

    fn dispatch(
        &mut self,
        exec: &mut Executive,
        sems: &mut SemaphoreTable,
        timers: &mut TimerTable,
        ticks: &TickSource,
    ) {
        let command = &self.line[..self.len];
        let mut port = Port(&mut self.serial);
        match command {
            b"tasks" => {
                monitor::dump_tasks(&mut port, exec).ok();
            }
            b"sems" => {
                monitor::dump_semaphores(&mut port, sems).ok();
            }
            b"timers" => {
                monitor::dump_timers(&mut port, timers).ok();
            }
            b"tick" => {
                ticks.record();
                uwrite!(port, "ok\r\n").ok();
            }
            b"service" => {
                timers.tick(ticks);
                uwrite!(port, "ok\r\n").ok();
            }
            b"switch" => match exec.switch() {
                Ok(()) => {
                    if let Some(id) = exec.current() {
                        uwrite!(port, "task {}\r\n", id).ok();
                    }
                }
                Err(e) => {
                    uwrite!(port, "{}\r\n", e).ok();
                }
            },
            b"help" => {
                uwrite!(port, "tasks sems timers tick service switch\r\n").ok();
            }
            _ => {
                uwrite!(port, "?\r\n").ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh0::serial::{Mock as SerialMock, Transaction};
    use std::cell::RefCell;

    thread_local! {
        static FIRED: RefCell<u32> = RefCell::new(0);
    }

    fn on_fire(_ctx: usize) {
        FIRED.with(|f| *f.borrow_mut() += 1);
    }

    fn noop(_ctx: usize) {}

    fn kernel() -> (Executive, SemaphoreTable, TimerTable, TickSource) {
        let mut exec = Executive::new();
        exec.init();
        let mut sems = SemaphoreTable::new();
        sems.init();
        let mut timers = TimerTable::new();
        timers.init();
        (exec, sems, timers, TickSource::new())
    }

    fn feed(cmd: &[u8]) -> Vec<Transaction<u8>> {
        let mut t = vec![Transaction::read_many(cmd)];
        t.push(Transaction::read(b'\r'));
        t
    }

    #[test]
    fn unknown_command_answers_question_mark() {
        let (mut exec, mut sems, mut timers, ticks) = kernel();
        let mut expectations = feed(b"bogus");
        expectations.push(Transaction::write_many(b"?\r\n"));
        let mut shell = Shell::new(SerialMock::new(&expectations));

        shell.poll(&mut exec, &mut sems, &mut timers, &ticks);
        shell.into_serial().done();
    }

    #[test]
    fn switch_reports_no_runnable_on_empty_table() {
        let (mut exec, mut sems, mut timers, ticks) = kernel();
        let mut expectations = feed(b"switch");
        expectations.push(Transaction::write_many(b"no task to run\r\n"));
        let mut shell = Shell::new(SerialMock::new(&expectations));

        shell.poll(&mut exec, &mut sems, &mut timers, &ticks);
        shell.into_serial().done();
    }

    #[test]
    fn switch_dispatches_and_names_the_task() {
        let (mut exec, mut sems, mut timers, ticks) = kernel();
        exec.add(noop, 0).unwrap();
        let mut expectations = feed(b"switch");
        expectations.push(Transaction::write_many(b"task 0\r\n"));
        let mut shell = Shell::new(SerialMock::new(&expectations));

        shell.poll(&mut exec, &mut sems, &mut timers, &ticks);
        assert_eq!(exec.current(), Some(0));
        shell.into_serial().done();
    }

    #[test]
    fn tick_then_service_fires_an_armed_timer() {
        let (mut exec, mut sems, mut timers, ticks) = kernel();
        let h = timers.allocate(on_fire, 0, "t").unwrap();
        timers.set_count(h, 1).unwrap();

        let mut expectations = feed(b"tick");
        expectations.push(Transaction::write_many(b"ok\r\n"));
        expectations.extend(feed(b"service"));
        expectations.push(Transaction::write_many(b"ok\r\n"));
        let mut shell = Shell::new(SerialMock::new(&expectations));

        shell.poll(&mut exec, &mut sems, &mut timers, &ticks);
        assert_eq!(ticks.pending(), 1);
        shell.poll(&mut exec, &mut sems, &mut timers, &ticks);
        assert_eq!(FIRED.with(|f| *f.borrow()), 1);
        shell.into_serial().done();
    }

    #[test]
    fn timer_dump_renders_the_table() {
        let (mut exec, mut sems, mut timers, ticks) = kernel();
        let h = timers.allocate(noop, 0, "led").unwrap();
        timers.set_count(h, 3).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"0: 3 ALLOCATED COUNTING led\r\n");
        for line in 1..crate::config::NUM_SWTIMERS {
            expected.extend_from_slice(format!("{}: 0 \r\n", line).as_bytes());
        }
        let mut expectations = feed(b"timers");
        expectations.push(Transaction::write_many(expected));
        let mut shell = Shell::new(SerialMock::new(&expectations));

        shell.poll(&mut exec, &mut sems, &mut timers, &ticks);
        shell.into_serial().done();
    }
}
