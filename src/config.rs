//! Configuration constants for the executive

/// Task table capacity
pub const MAX_TASKS: usize = 5;

/// Semaphore table capacity
pub const MAX_SEMAPHORES: usize = 10;

/// Software timer table capacity
pub const NUM_SWTIMERS: usize = 10;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate for the shell console
pub const UART_BAUD: u32 = 9600;

/// Shell input line capacity in bytes
pub const SHELL_LINE_LEN: usize = 32;
