//! File Descriptor Table
//!
//! Maps a process's small-integer descriptors to open-file handles.
//!
//! # Design
//! - One table per process, touched only by the owning kernel thread
//! - Entries are kept sorted ascending by descriptor; lookup is the same
//!   linear scan user programs were tuned against
//! - Descriptor values come from one boot-wide strictly increasing counter
//!   starting at 3 and are never reused, so a stale descriptor can never
//!   alias a fresh one
//! - Descriptors 0 (console in) and 1 (console out) are recognized before
//!   the table is consulted and never appear as entries

pub mod table;

pub use table::{DescriptorCounter, Fd, FdEntry, FdTable, FdTableError};
