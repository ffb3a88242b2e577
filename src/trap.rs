//! Trap Frame
//!
//! The register state captured when control enters the kernel from user
//! mode. The assembly exception vectors (owned by the boot crate) save
//! x0-x30, ELR and SPSR on the kernel stack and hand the dispatcher a
//! mutable reference to this layout.
//!
//! # Syscall ABI
//! - x8: system call number
//! - x0-x5: arguments, in fixed order
//! - x0: return value, written back before ERET
//!
//! # Security Considerations
//! - The frame is exclusively owned by the dispatcher for the duration of
//!   one syscall; user mode cannot mutate it concurrently
//! - A copy is snapshotted into the owning process before dispatch so a
//!   subsequent `fork` can reconstruct the child's context

/// Saved user-mode register state.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TrapFrame {
    /// General purpose registers x0-x30
    pub gpr: [u64; 31],
    /// Exception Link Register (user return address)
    pub elr: u64,
    /// Saved Program Status Register
    pub spsr: u64,
}

/// Number of argument registers in the syscall convention (x0-x5).
pub const SYSCALL_ARGS: usize = 6;

impl TrapFrame {
    /// A zeroed frame, for process bring-up and tests.
    pub const fn zeroed() -> Self {
        Self {
            gpr: [0; 31],
            elr: 0,
            spsr: 0,
        }
    }

    /// System call number, from x8.
    #[inline]
    pub fn syscall_number(&self) -> u64 {
        self.gpr[8]
    }

    /// Set the system call number (used by tests and by user-mode setup).
    #[inline]
    pub fn set_syscall_number(&mut self, nr: u64) {
        self.gpr[8] = nr;
    }

    /// The `n`-th syscall argument, from x0-x5.
    ///
    /// # Panics
    /// Panics if `n >= SYSCALL_ARGS`; the dispatcher only extracts the
    /// argument count each handler declares.
    #[inline]
    pub fn arg(&self, n: usize) -> u64 {
        assert!(n < SYSCALL_ARGS);
        self.gpr[n]
    }

    /// Set the `n`-th syscall argument.
    #[inline]
    pub fn set_arg(&mut self, n: usize, value: u64) {
        assert!(n < SYSCALL_ARGS);
        self.gpr[n] = value;
    }

    /// Write the syscall return value into x0.
    #[inline]
    pub fn set_return(&mut self, value: i64) {
        self.gpr[0] = value as u64;
    }

    /// Read back the syscall return value from x0.
    #[inline]
    pub fn return_value(&self) -> i64 {
        self.gpr[0] as i64
    }
}

impl Default for TrapFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}
