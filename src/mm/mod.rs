//! Memory management module for OcelotOS
//!
//! Provides the kernel heap. Paging, frame allocation and the
//! user/kernel address-space split itself belong to the boot crate; the
//! syscall layer consumes the split only through
//! [`crate::syscall::UserSpan`].
//!
//! # Security Principles
//! - All allocations are bounds-checked
//! - Memory initialization is guaranteed
//! - Unsafe code is minimal and audited

mod allocator;

pub use allocator::{heap_size, init_heap};
