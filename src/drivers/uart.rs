//! PL011 UART Driver for QEMU virt machine
//!
//! Serial console for the kernel: transmit for diagnostics and stdout,
//! receive for the stdin syscall path.
//!
//! # Memory Map (QEMU virt)
//! - Base address: 0x0900_0000
//! - Register size: 0x1000 bytes
//!
//! # Security Considerations
//! - Console input is raw untrusted bytes; nothing here interprets them
//! - Unsafe code is minimal and limited to MMIO accesses
//! - Uses spinlock for thread-safe access

use core::fmt::{self, Write};
use spin::Mutex;

use crate::console::Console;

/// QEMU virt machine PL011 UART base address
const UART_BASE: usize = 0x0900_0000;

/// PL011 Register offsets
mod regs {
    /// Data Register - read/write data
    pub const DR: usize = 0x00;
    /// Flag Register - status flags
    pub const FR: usize = 0x18;
}

/// Flag Register bits
mod flags {
    /// Receive FIFO empty
    pub const RXFE: u32 = 1 << 4;
    /// Transmit FIFO full
    pub const TXFF: u32 = 1 << 5;
}

/// PL011 UART driver
pub struct Uart {
    base: usize,
    initialized: bool,
}

impl Uart {
    /// Create a new UART instance (not yet initialized)
    ///
    /// # Safety
    /// The base address must be valid and mapped.
    pub const fn new(base: usize) -> Self {
        Self {
            base,
            initialized: false,
        }
    }

    /// Initialize the UART
    ///
    /// # Safety
    /// - Must only be called once
    /// - UART base address must be valid (guaranteed by the QEMU virt
    ///   machine specification)
    pub unsafe fn init(&mut self) {
        // PL011 is already initialized by QEMU, just mark as ready
        self.initialized = true;
    }

    fn reg(&self, offset: usize) -> *mut u32 {
        (self.base + offset) as *mut u32
    }

    /// Write a single byte to the UART
    fn write_byte(&self, byte: u8) {
        if !self.initialized {
            return;
        }

        // SAFETY: Base address is validated during init(); volatile
        // accesses are appropriate for MMIO
        unsafe {
            // Wait for transmit FIFO to have space
            while core::ptr::read_volatile(self.reg(regs::FR)) & flags::TXFF != 0 {
                core::hint::spin_loop();
            }
            core::ptr::write_volatile(self.reg(regs::DR), byte as u32);
        }
    }

    /// Read a single byte, blocking until one arrives.
    ///
    /// Returns 0 before `init`, so a stray early read cannot touch MMIO.
    pub fn read_byte(&self) -> u8 {
        if !self.initialized {
            return 0;
        }

        // SAFETY: Same MMIO argument as write_byte
        unsafe {
            // Wait for receive FIFO to hold a byte
            while core::ptr::read_volatile(self.reg(regs::FR)) & flags::RXFE != 0 {
                core::hint::spin_loop();
            }
            (core::ptr::read_volatile(self.reg(regs::DR)) & 0xff) as u8
        }
    }

    /// Write a string to the UART
    pub fn write_str(&self, s: &str) {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
    }
}

impl Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Uart::write_str(self, s);
        Ok(())
    }
}

/// Global UART instance protected by spinlock
pub static UART: Mutex<Uart> = Mutex::new(Uart::new(UART_BASE));

/// The UART as the kernel console collaborator.
///
/// Zero-sized handle over the global [`UART`]; the syscall layer's I/O
/// lock already serializes callers, the inner spinlock guards against
/// diagnostics interleaving from other contexts.
pub struct UartConsole;

impl Console for UartConsole {
    fn read_char(&self) -> u8 {
        UART.lock().read_byte()
    }

    fn write_buffer(&self, buf: &[u8]) {
        let uart = UART.lock();
        for &byte in buf {
            if byte == b'\n' {
                uart.write_byte(b'\r');
            }
            uart.write_byte(byte);
        }
    }
}

/// Print macro for kernel output
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let mut uart = $crate::drivers::uart::UART.lock();
        let _ = write!(uart, $($arg)*);
    }};
}

/// Println macro for kernel output
#[macro_export]
macro_rules! kprintln {
    () => {
        $crate::kprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::kprint!($($arg)*);
        $crate::kprint!("\n");
    }};
}
