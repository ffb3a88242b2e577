//! Console Collaborator Interface
//!
//! Descriptors 0 and 1 never reach the descriptor table; reads on 0 and
//! writes on 1 go straight to this trait. The shipped implementation is
//! the PL011 UART in [`crate::drivers::uart`]; tests script one in memory.
//!
//! The process termination message (`"{name}: exit({status})"`) is also
//! written here: it is part of the observable contract with user programs,
//! not a diagnostic, so it must not depend on the logger being installed.

/// Character console used by the stdin/stdout syscall paths.
pub trait Console: Send + Sync {
    /// Read one byte, blocking until one is available.
    fn read_char(&self) -> u8;

    /// Write a buffer. The console never reports short writes; truncation
    /// inside the device is invisible to the caller by design.
    fn write_buffer(&self, buf: &[u8]);
}
