//! Interrupt masking primitive shared by kernel and board code

/// Run `f` with interrupts masked.
///
/// The executive shares exactly one datum with interrupt context (the tick
/// accumulator), and its read-and-clear must not lose an increment from the
/// tick ISR.
#[cfg(all(feature = "atmega128", target_arch = "avr"))]
pub fn interrupt_free<R>(f: impl FnOnce() -> R) -> R {
    avr_device::interrupt::free(|_| f())
}

/// Host fallback: no interrupts exist, tests drive the tick source from the
/// same thread, so the section body runs unguarded.
#[cfg(not(all(feature = "atmega128", target_arch = "avr")))]
pub fn interrupt_free<R>(f: impl FnOnce() -> R) -> R {
    f()
}
