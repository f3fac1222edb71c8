#![no_std]
#![no_main]

use panic_halt as _;

use atmega128_executive::board::{SerialPort, TickTimer};
use atmega128_executive::rtos::{Executive, SemaphoreTable, TimerTable, TICK_SOURCE};
use atmega128_executive::shell::Shell;
use avr_device::atmega128::Peripherals;
use core::sync::atomic::{AtomicU32, Ordering};

static BLINK_COUNT: AtomicU32 = AtomicU32::new(0);
static HEARTBEAT_COUNT: AtomicU32 = AtomicU32::new(0);

#[avr_device::entry]
fn main() -> ! {
    let dp = Peripherals::take().unwrap();

    let mut tick_timer = TickTimer::new(dp.TC0);
    tick_timer.start();
    let serial = SerialPort::new(dp.USART0);

    unsafe { avr_device::interrupt::enable() };

    let mut exec = Executive::new();
    exec.init();
    let mut sems = SemaphoreTable::new();
    sems.init();
    let mut timers = TimerTable::new();
    timers.init();

    exec.add(task_blink, 0).ok();
    exec.add(task_heartbeat, 0).ok();
    sems.allocate(1, "console").ok();

    if let Ok(handle) = timers.allocate(on_blink_timer, 0, "blink") {
        timers.set_count(handle, 500).ok();
    }

    let mut shell = Shell::new(serial);

    loop {
        shell.poll(&mut exec, &mut sems, &mut timers, &TICK_SOURCE);
        exec.switch().ok();
        timers.tick(&TICK_SOURCE);
    }
}

fn task_blink(_ctx: usize) {
    BLINK_COUNT.fetch_add(1, Ordering::Relaxed);
}

fn task_heartbeat(_ctx: usize) {
    HEARTBEAT_COUNT.fetch_add(1, Ordering::Relaxed);
}

fn on_blink_timer(_ctx: usize) {
    BLINK_COUNT.store(0, Ordering::Relaxed);
}
