//! ATmega128 bring-up: tick interrupt source and shell console port

use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use avr_device::atmega128::{TC0, USART0};
use embedded_hal::serial;

// Timer0 overflow with /64 prescaling: 16MHz / 64 / 256 ≈ 1ms per tick
const TICK_PRESCALE_BITS: u8 = 0x03;

/// Hardware tick source: TC0 overflow interrupt feeding the executive's
/// tick accumulator.
pub struct TickTimer {
    tc0: TC0,
}

impl TickTimer {
    pub fn new(tc0: TC0) -> Self {
        Self { tc0 }
    }

    /// Start ticking and enable the overflow interrupt.
    pub fn start(&mut self) {
        self.tc0.tcnt0.write(|w| w.bits(0));
        self.tc0
            .tccr0
            .write(|w| unsafe { w.bits(TICK_PRESCALE_BITS) });
        self.tc0.timsk.modify(|r, w| unsafe { w.bits(r.bits() | 1) });
    }

    pub fn stop(&mut self) {
        self.tc0.tccr0.write(|w| unsafe { w.bits(0) });
    }
}

#[avr_device::interrupt(atmega128)]
fn TIMER0_OVF() {
    crate::rtos::swtimer::tick_handler();
}

/// Polled USART0 port for the shell.
pub struct SerialPort {
    usart: USART0,
}

impl SerialPort {
    pub fn new(usart: USART0) -> Self {
        let ubrr = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;
        usart.ubrr0.write(|w| unsafe { w.bits(ubrr) });
        usart
            .ucsr0b
            .modify(|_, w| w.rxen0().set_bit().txen0().set_bit());
        Self { usart }
    }
}

impl serial::Read<u8> for SerialPort {
    type Error = core::convert::Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.usart.ucsr0a.read().rxc0().bit_is_set() {
            Ok(self.usart.udr0.read().bits())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl serial::Write<u8> for SerialPort {
    type Error = core::convert::Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.usart.ucsr0a.read().udre0().bit_is_set() {
            self.usart.udr0.write(|w| unsafe { w.bits(byte) });
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.usart.ucsr0a.read().txc0().bit_is_set() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}
