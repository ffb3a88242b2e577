//! System Call Interface
//!
//! The trust boundary of the kernel: receives a trapped user request,
//! validates it, dispatches to a handler, and hands a verdict back to the
//! trap glue.
//!
//! # Security Model
//! - Whitelist approach: only explicitly implemented syscalls dispatch;
//!   unknown numbers terminate the caller
//! - All parameters are validated before use
//! - A handler either returns a concrete value or a termination verdict;
//!   nothing unwinds across the syscall boundary
//!
//! # Current Syscalls
//! halt, exit, fork, exec, wait, create, remove, open, filesize, read,
//! write, seek, tell, close, dup2; numbers in [`handler::numbers`].

pub mod handler;
pub mod validate;

pub use handler::{numbers, Control, Flow, Syscalls};
pub use validate::{Fault, UserBuffer, UserBufferMut, UserSpan};
