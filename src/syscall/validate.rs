//! Syscall Argument Validation
//!
//! Classifies user-supplied pointers against the legal user address range
//! before the kernel touches them.
//!
//! # Security Principles
//! - Validate ALL inputs before use
//! - Fail-secure: a pointer that cannot be proven user-range is hostile
//! - The validator only classifies addresses, it never dereferences an
//!   unvalidated one, so it cannot itself fault
//! - Policy lives upstream: failures are reported as [`Fault`] values and
//!   the dispatcher turns them into process termination; no hidden
//!   non-local exits from down here
//!
//! Null pointers are special: several syscalls specify a *recoverable*
//! result for a null name (false / -1), so those handlers check for null
//! before validating; the validator itself treats null as a fault.

use alloc::string::String;

/// The legal user address range for this boot.
///
/// Owned by the syscall layer configuration, handed down by whoever set up
/// the address-space split. Addresses in `start..end` are user space; the
/// zero page and everything at `end` and above (the kernel) are not.
#[derive(Debug, Clone, Copy)]
pub struct UserSpan {
    start: usize,
    end: usize,
}

impl UserSpan {
    /// A span covering `start..end`.
    ///
    /// # Panics
    /// Panics if `start >= end`; a backwards split is a boot bug, not a
    /// user error.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start < end, "backwards user address range");
        Self { start, end }
    }

    /// Whether `addr` is a legal user address.
    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Exclusive upper bound.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }
}

/// Why validation rejected an argument.
///
/// Every variant is fatal to the calling process; the distinction exists
/// for the log line, not for recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Null pointer where an address was required.
    NullPointer,
    /// Address outside the user range.
    OutOfRange,
    /// `ptr + len` wrapped the address space.
    Overflow,
    /// A user string ran past the end of user space without a NUL.
    Unterminated,
}

impl core::fmt::Display for Fault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NullPointer => write!(f, "null pointer"),
            Self::OutOfRange => write!(f, "address outside user space"),
            Self::Overflow => write!(f, "buffer length overflows"),
            Self::Unterminated => write!(f, "unterminated user string"),
        }
    }
}

/// A validated user-space buffer.
///
/// Only constructed after validation passes, so holding one is proof the
/// span check happened. The contents can still change under us (user
/// threads keep running on other cores); nothing here assumes otherwise.
#[derive(Debug)]
pub struct UserBuffer {
    ptr: *const u8,
    len: usize,
}

impl UserBuffer {
    /// View the buffer as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY:
        // - Pointer and length were validated against the user span
        // - User memory is mapped and readable from the kernel
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }
}

/// A validated mutable user-space buffer.
#[derive(Debug)]
pub struct UserBufferMut {
    ptr: *mut u8,
    len: usize,
}

impl UserBufferMut {
    /// View the buffer as a mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: Same bounds argument as UserBuffer::as_bytes
        unsafe { core::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

/// Validate a user-space read buffer.
///
/// # Checks
/// 1. Null is rejected (unless zero-length)
/// 2. Start is within the user span
/// 3. `ptr + len` does not overflow
/// 4. The end stays within the user span
pub fn user_buffer(span: &UserSpan, ptr: usize, len: usize) -> Result<UserBuffer, Fault> {
    // Zero-length accesses are valid at any address
    if len == 0 {
        return Ok(UserBuffer {
            ptr: ptr as *const u8,
            len: 0,
        });
    }

    check_range(span, ptr, len)?;

    Ok(UserBuffer {
        ptr: ptr as *const u8,
        len,
    })
}

/// Validate a user-space write buffer. Same checks as [`user_buffer`].
pub fn user_buffer_mut(span: &UserSpan, ptr: usize, len: usize) -> Result<UserBufferMut, Fault> {
    let buf = user_buffer(span, ptr, len)?;
    Ok(UserBufferMut {
        ptr: buf.ptr as *mut u8,
        len: buf.len,
    })
}

/// Read a NUL-terminated string out of user memory.
///
/// Walks one byte at a time, proving each address user-range before the
/// load, and stops at the first NUL. Running off the end of user space is
/// a fault. Non-UTF-8 names are replaced lossily; the file system never
/// sees raw invalid bytes.
pub fn user_cstr(span: &UserSpan, ptr: usize) -> Result<String, Fault> {
    if ptr == 0 {
        return Err(Fault::NullPointer);
    }

    let mut bytes = alloc::vec::Vec::new();
    let mut addr = ptr;
    loop {
        if !span.contains(addr) {
            return Err(if addr == ptr {
                Fault::OutOfRange
            } else {
                Fault::Unterminated
            });
        }
        // SAFETY: addr was just proven to be a mapped user address
        let byte = unsafe { core::ptr::read(addr as *const u8) };
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        addr += 1;
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn check_range(span: &UserSpan, ptr: usize, len: usize) -> Result<(), Fault> {
    if ptr == 0 {
        return Err(Fault::NullPointer);
    }
    if !span.contains(ptr) {
        return Err(Fault::OutOfRange);
    }
    let end = ptr.checked_add(len).ok_or(Fault::Overflow)?;
    if end > span.end() {
        return Err(Fault::OutOfRange);
    }
    Ok(())
}
