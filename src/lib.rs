//! OcelotOS - Syscall Boundary of a Teaching ARM64 Kernel
//!
//! This crate is the system-call layer of OcelotOS: it receives a trapped
//! user-mode request, validates every argument against the user address
//! range, dispatches it to the matching handler, and writes the result back
//! into the saved register frame. Everything user mode hands us is hostile
//! until proven otherwise.
//!
//! # Security Model
//! - Whitelist dispatch: only the 15 implemented syscalls are reachable,
//!   unknown numbers terminate the caller
//! - Every user pointer is classified against the user address range before
//!   the kernel touches it; violations terminate the caller with status -1
//! - Handlers never exit non-locally: each returns `Ok(value)` or a
//!   termination verdict that the dispatcher enacts exactly once
//! - No panics on user input (return errors or terminate the process)
//!
//! # Layering
//! The file system, process management (fork/exec/wait mechanics), and the
//! trap entry glue are collaborators behind traits in [`fs`], [`process`]
//! and [`console`]; this crate owns the descriptor table, the validator,
//! the dispatcher and the I/O serialization discipline. The boot crate is
//! expected to provide the panic handler and call [`mm::init_heap`] and
//! [`klog::init`] before the first trap.
//!
//! # Architecture
//! - Target: AArch64 (ARM64)
//! - Syscall convention: number in x8, arguments in x0-x5, result in x0
//!
//! Unit tests build hosted (`std`), so the whole trust boundary is
//! exercised with mock collaborators on the development machine.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod console;
pub mod drivers;
pub mod fd;
pub mod fs;
pub mod klog;
pub mod mm;
pub mod process;
pub mod syscall;
pub mod trap;

/// Kernel version string
pub const VERSION: &str = "0.3.0";
