//! File System Collaborator Interface
//!
//! The syscall layer does not implement a file system; it drives one
//! through the narrow traits below. The real backend lives outside this
//! crate, tests use an in-memory one.
//!
//! # Design
//! - [`File`] is one *open-file description*: it owns the cursor position
//!   and the deny-write flag, so two descriptors duplicated onto the same
//!   description share both. Two separate `open()` calls yield independent
//!   descriptions of the same underlying file.
//! - Implementations use interior mutability; the syscall layer serializes
//!   all calls behind its I/O lock, so a `spin::Mutex` inside the backend
//!   is uncontended but still required for soundness.
//! - Closing is dropping: when the last [`FileRef`] clone goes away the
//!   backend releases whatever the description holds.

use alloc::string::String;
use alloc::sync::Arc;
use bitflags::bitflags;

bitflags! {
    /// Access mode of an open-file description.
    ///
    /// `deny_write` clears WRITE; rights are only ever reduced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileMode: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
    }
}

/// One open-file description.
///
/// All byte counts are actual counts; short reads/writes are legal and the
/// syscall layer passes them through unchanged.
pub trait File: Send + Sync {
    /// Read from the current position, advancing it. Returns bytes read.
    fn read(&self, buf: &mut [u8]) -> usize;

    /// Write at the current position, advancing it. Returns bytes written
    /// (0 if the description is not writable).
    fn write(&self, buf: &[u8]) -> usize;

    /// Move the position to an absolute byte offset. Seeking past the end
    /// is allowed; what a later write does there is the backend's policy.
    fn seek(&self, pos: usize);

    /// Current position.
    fn tell(&self) -> usize;

    /// Length of the underlying file in bytes.
    fn len(&self) -> usize;

    /// Whether the underlying file is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop WRITE from the mode. Used to keep a running program from
    /// rewriting its own executable. Irrevocable for this description.
    fn deny_write(&self);

    /// Current access mode.
    fn mode(&self) -> FileMode;
}

/// Shared handle to an open-file description.
///
/// `dup2` clones this, which is exactly what makes position and deny-write
/// state shared between the two descriptors.
pub type FileRef = Arc<dyn File>;

/// The file system backend.
pub trait FileSystem: Send + Sync {
    /// Create `name` with an initial size. `false` if it already exists or
    /// the backend refuses the name.
    fn create(&self, name: &str, initial_size: usize) -> bool;

    /// Remove `name`. `false` if it does not exist. Open descriptions of a
    /// removed file stay usable until dropped (backend contract).
    fn remove(&self, name: &str) -> bool;

    /// Open `name`, yielding a fresh description positioned at 0 with
    /// READ | WRITE, or `None` if it does not exist.
    fn open(&self, name: &str) -> Option<FileRef>;
}

/// Owned file name as read out of user memory.
pub type FileName = String;
