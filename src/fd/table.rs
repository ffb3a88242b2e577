//! Descriptor table and descriptor issuance.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicI32, Ordering};

use crate::fs::FileRef;

/// A file descriptor.
///
/// This is a newtype to prevent using arbitrary integers as descriptors.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct Fd(pub i32);

impl Fd {
    /// Console input. Never present in the table.
    pub const STDIN: Self = Self(0);

    /// Console output. Never present in the table.
    pub const STDOUT: Self = Self(1);

    /// First descriptor value the counter issues.
    pub const FIRST_FILE: Self = Self(3);

    /// Whether this descriptor is one of the reserved console streams.
    #[inline]
    pub const fn is_console(self) -> bool {
        self.0 == Self::STDIN.0 || self.0 == Self::STDOUT.0
    }
}

impl core::fmt::Display for Fd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

/// Error type for table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdTableError {
    /// The descriptor is already bound in this table.
    Occupied,
    /// The entry could not be allocated.
    NoMemory,
}

impl core::fmt::Display for FdTableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Occupied => write!(f, "descriptor already bound"),
            Self::NoMemory => write!(f, "out of memory for table entry"),
        }
    }
}

/// Boot-wide descriptor counter.
///
/// Issues strictly increasing values shared by all processes; a closed
/// descriptor's value is never handed out again. Owned by the syscall
/// layer, never a free-standing global.
#[derive(Debug)]
pub struct DescriptorCounter(AtomicI32);

impl DescriptorCounter {
    /// Counter positioned at the first file descriptor.
    pub const fn new() -> Self {
        Self(AtomicI32::new(Fd::FIRST_FILE.0))
    }

    /// Issue the next descriptor.
    ///
    /// `Relaxed` suffices: issuance needs uniqueness and monotonicity, not
    /// ordering against other memory.
    #[inline]
    pub fn next(&self) -> Fd {
        Fd(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DescriptorCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// One table entry: a descriptor bound to a shared open-file handle.
#[derive(Clone)]
pub struct FdEntry {
    pub fd: Fd,
    pub file: FileRef,
}

impl core::fmt::Debug for FdEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FdEntry({})", self.fd)
    }
}

/// Per-process descriptor table, sorted ascending by descriptor.
///
/// Insertion keeps the order by value, not by arrival time, so the table
/// reads the same no matter how dup2 interleaved with opens.
#[derive(Debug, Default)]
pub struct FdTable {
    entries: Vec<FdEntry>,
}

impl FdTable {
    /// Empty table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind `fd` to `file`, keeping ascending order.
    ///
    /// Fails with [`FdTableError::Occupied`] if `fd` is already bound and
    /// with [`FdTableError::NoMemory`] if the entry cannot be allocated;
    /// in the latter case the caller must release the handle it was about
    /// to insert, or it leaks.
    pub fn insert(&mut self, fd: Fd, file: FileRef) -> Result<(), FdTableError> {
        let idx = match self.entries.binary_search_by_key(&fd, |e| e.fd) {
            Ok(_) => return Err(FdTableError::Occupied),
            Err(idx) => idx,
        };
        self.entries
            .try_reserve(1)
            .map_err(|_| FdTableError::NoMemory)?;
        self.entries.insert(idx, FdEntry { fd, file });
        Ok(())
    }

    /// Make room for one more entry without binding anything.
    ///
    /// Lets a caller that must unbind before it can rebind (dup2 onto an
    /// open descriptor) prove the rebind will succeed first.
    pub fn reserve(&mut self) -> Result<(), FdTableError> {
        self.entries
            .try_reserve(1)
            .map_err(|_| FdTableError::NoMemory)
    }

    /// Resolve `fd` to its handle.
    ///
    /// Linear scan; console descriptors are the caller's business and are
    /// never found here. Unknown and already-closed descriptors yield
    /// `None`.
    pub fn lookup(&self, fd: Fd) -> Option<FileRef> {
        self.entries
            .iter()
            .find(|e| e.fd == fd)
            .map(|e| e.file.clone())
    }

    /// Unbind `fd`, returning its handle, or `None` if unbound.
    pub fn remove(&mut self, fd: Fd) -> Option<FileRef> {
        let idx = self.entries.iter().position(|e| e.fd == fd)?;
        Some(self.entries.remove(idx).file)
    }

    /// Whether `fd` is bound.
    pub fn contains(&self, fd: Fd) -> bool {
        self.entries.iter().any(|e| e.fd == fd)
    }

    /// Number of bound descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending descriptor order. Used when a fork rebuilds
    /// the child's table with equivalent handles.
    pub fn iter(&self) -> impl Iterator<Item = &FdEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{File, FileMode};
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    struct Dummy;

    impl File for Dummy {
        fn read(&self, _buf: &mut [u8]) -> usize {
            0
        }
        fn write(&self, _buf: &[u8]) -> usize {
            0
        }
        fn seek(&self, _pos: usize) {}
        fn tell(&self) -> usize {
            0
        }
        fn len(&self) -> usize {
            0
        }
        fn deny_write(&self) {}
        fn mode(&self) -> FileMode {
            FileMode::READ
        }
    }

    fn dummy() -> FileRef {
        Arc::new(Dummy)
    }

    #[test]
    fn counter_is_strictly_increasing_from_three() {
        let counter = DescriptorCounter::new();
        assert_eq!(counter.next(), Fd(3));
        assert_eq!(counter.next(), Fd(4));
        assert_eq!(counter.next(), Fd(5));
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut table = FdTable::new();
        table.insert(Fd(7), dummy()).unwrap();
        table.insert(Fd(3), dummy()).unwrap();
        table.insert(Fd(5), dummy()).unwrap();
        let fds: Vec<Fd> = table.iter().map(|e| e.fd).collect();
        assert_eq!(fds, [Fd(3), Fd(5), Fd(7)]);
    }

    #[test]
    fn insert_rejects_bound_descriptor() {
        let mut table = FdTable::new();
        table.insert(Fd(3), dummy()).unwrap();
        assert_eq!(table.insert(Fd(3), dummy()), Err(FdTableError::Occupied));
    }

    #[test]
    fn remove_then_lookup_reports_not_found() {
        let mut table = FdTable::new();
        table.insert(Fd(3), dummy()).unwrap();
        assert!(table.remove(Fd(3)).is_some());
        assert!(table.lookup(Fd(3)).is_none());
        assert!(table.remove(Fd(3)).is_none());
    }

    #[test]
    fn lookup_clones_the_shared_handle() {
        let mut table = FdTable::new();
        let file = dummy();
        table.insert(Fd(3), file.clone()).unwrap();
        let looked = table.lookup(Fd(3)).unwrap();
        assert!(Arc::ptr_eq(&file, &looked));
    }

    #[test]
    fn reserve_makes_room_without_binding() {
        let mut table = FdTable::new();
        table.reserve().unwrap();
        assert!(table.is_empty());
        table.insert(Fd(3), dummy()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn console_descriptors_are_never_found() {
        let table = FdTable::new();
        assert!(Fd::STDIN.is_console());
        assert!(Fd::STDOUT.is_console());
        assert!(table.lookup(Fd::STDIN).is_none());
        assert!(table.lookup(Fd::STDOUT).is_none());
    }
}
