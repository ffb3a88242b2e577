//! System Call Dispatch and Handlers
//!
//! One handler per system call, one dispatch site that selects it by
//! number, extracts its arguments from the trap frame and writes the
//! result back.
//!
//! # Security Considerations
//! - Unknown syscall numbers terminate the caller; nothing undefined runs
//! - Each handler validates its own arguments before any side effect
//! - Handlers never terminate the process themselves: they return
//!   [`Control`] and the dispatcher enacts it exactly once, which keeps
//!   every handler unit-testable and every exit path symmetric
//! - All file-system and console work happens inside the I/O serialization
//!   lock, acquired and released on every path including errors

use alloc::format;
use alloc::string::String;

use crate::console::Console;
use crate::fd::{DescriptorCounter, Fd};
use crate::fs::FileSystem;
use crate::process::{Pid, Process, ProcessManager};
use crate::trap::TrapFrame;

use super::validate::{self, Fault, UserBuffer, UserBufferMut, UserSpan};

/// System call numbers: the wire contract with user binaries.
///
/// The numbering is self-consistent for this kernel: 0..=13 in the order
/// of the handler table, dup2 appended as 14. Argument order per call is
/// fixed (x0..x5), result in x0.
pub mod numbers {
    pub const SYS_HALT: u64 = 0;
    pub const SYS_EXIT: u64 = 1;
    pub const SYS_FORK: u64 = 2;
    pub const SYS_EXEC: u64 = 3;
    pub const SYS_WAIT: u64 = 4;
    pub const SYS_CREATE: u64 = 5;
    pub const SYS_REMOVE: u64 = 6;
    pub const SYS_OPEN: u64 = 7;
    pub const SYS_FILESIZE: u64 = 8;
    pub const SYS_READ: u64 = 9;
    pub const SYS_WRITE: u64 = 10;
    pub const SYS_SEEK: u64 = 11;
    pub const SYS_TELL: u64 = 12;
    pub const SYS_CLOSE: u64 = 13;
    pub const SYS_DUP2: u64 = 14;
}

/// Failure sentinel returned to user space by recoverable-negative calls.
const FAILURE: i64 = -1;

/// Exit status recorded when the kernel kills a process for a violation.
const FATAL_STATUS: i32 = -1;

/// Termination verdict a handler hands back instead of exiting in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Terminate the calling process with this exit status.
    Exit(i32),
    /// Power down the machine. Never returns to user mode.
    Halt,
}

/// What the trap glue should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Return to user mode; the frame carries the result.
    Resume,
    /// Unschedule and reap the calling process.
    Terminate(i32),
    /// Power down the machine.
    Halt,
}

/// Per-handler result: a value for the frame, or a termination verdict.
type HandlerResult = Result<i64, Control>;

/// The syscall layer.
///
/// Owns the collaborator seams, the user address span, descriptor
/// issuance and the I/O serialization lock. One instance per boot; the
/// trap glue calls [`Syscalls::dispatch`] on the calling process's kernel
/// thread.
pub struct Syscalls<'a> {
    fs: &'a dyn FileSystem,
    console: &'a dyn Console,
    procs: &'a dyn ProcessManager,
    user_span: UserSpan,
    descriptors: DescriptorCounter,
    /// Serializes every file-system and console operation. The underlying
    /// collaborators are not assumed safe for concurrent entry; holding
    /// this for the whole guarded operation is what keeps reads and
    /// writes from interleaving partially.
    io_lock: spin::Mutex<()>,
}

impl<'a> Syscalls<'a> {
    /// Wire up the syscall layer for this boot.
    pub fn new(
        fs: &'a dyn FileSystem,
        console: &'a dyn Console,
        procs: &'a dyn ProcessManager,
        user_span: UserSpan,
    ) -> Self {
        Self {
            fs,
            console,
            procs,
            user_span,
            descriptors: DescriptorCounter::new(),
            io_lock: spin::Mutex::new(()),
        }
    }

    /// Dispatch one trapped system call.
    ///
    /// Snapshots the frame into the process record (a later `fork` needs
    /// the caller's context as of *this* trap), selects the handler by
    /// number, writes the result into x0, and reports what the trap glue
    /// should do next.
    pub fn dispatch(&self, proc: &mut Process, frame: &mut TrapFrame) -> Flow {
        use numbers::*;

        // Exactly once per syscall, before the handler runs.
        proc.saved_frame = *frame;

        let nr = frame.syscall_number();
        let result = match nr {
            SYS_HALT => self.sys_halt(),
            SYS_EXIT => self.sys_exit(frame.arg(0) as i32),
            SYS_FORK => self.sys_fork(proc, frame.arg(0) as usize),
            SYS_EXEC => self.sys_exec(proc, frame.arg(0) as usize),
            SYS_WAIT => self.sys_wait(Pid(frame.arg(0) as u32)),
            SYS_CREATE => self.sys_create(frame.arg(0) as usize, frame.arg(1) as usize),
            SYS_REMOVE => self.sys_remove(frame.arg(0) as usize),
            SYS_OPEN => self.sys_open(proc, frame.arg(0) as usize),
            SYS_FILESIZE => self.sys_filesize(proc, Fd(frame.arg(0) as i32)),
            SYS_READ => self.sys_read(
                proc,
                Fd(frame.arg(0) as i32),
                frame.arg(1) as usize,
                frame.arg(2) as usize,
            ),
            SYS_WRITE => self.sys_write(
                proc,
                Fd(frame.arg(0) as i32),
                frame.arg(1) as usize,
                frame.arg(2) as usize,
            ),
            SYS_SEEK => self.sys_seek(proc, Fd(frame.arg(0) as i32), frame.arg(1) as usize),
            SYS_TELL => self.sys_tell(proc, Fd(frame.arg(0) as i32)),
            SYS_CLOSE => self.sys_close(proc, Fd(frame.arg(0) as i32)),
            SYS_DUP2 => self.sys_dup2(
                proc,
                Fd(frame.arg(0) as i32),
                Fd(frame.arg(1) as i32),
            ),
            _ => {
                log::warn!("unknown syscall {} from pid {}", nr, proc.pid);
                Err(Control::Exit(FATAL_STATUS))
            }
        };

        match result {
            Ok(value) => {
                frame.set_return(value);
                Flow::Resume
            }
            Err(Control::Exit(status)) => self.terminate(proc, status),
            Err(Control::Halt) => Flow::Halt,
        }
    }

    /// The single termination site.
    ///
    /// Records the status, prints the observable exit line, and tells the
    /// trap glue to unschedule the caller. A validation kill looks
    /// exactly like `exit(-1)` from here on, by design.
    fn terminate(&self, proc: &mut Process, status: i32) -> Flow {
        proc.exit_status = status;
        let msg = format!("{}: exit({})\n", proc.name, status);
        {
            // The exit line is console output like any other and must not
            // interleave with a concurrent stdout write.
            let _io = self.io_lock.lock();
            self.console.write_buffer(msg.as_bytes());
        }
        log::info!("pid {} terminated with status {}", proc.pid, status);
        Flow::Terminate(status)
    }

    // ---- handlers -------------------------------------------------------

    fn sys_halt(&self) -> HandlerResult {
        Err(Control::Halt)
    }

    fn sys_exit(&self, status: i32) -> HandlerResult {
        Err(Control::Exit(status))
    }

    fn sys_fork(&self, proc: &Process, name_ptr: usize) -> HandlerResult {
        let name = self.cstr(name_ptr)?;
        // A failed child startup surfaces as None here; the child's own
        // exit status carries the detail to its waiter.
        match self.procs.fork(&name, &proc.saved_frame) {
            Some(pid) => Ok(i64::from(pid.0)),
            None => Ok(FAILURE),
        }
    }

    fn sys_exec(&self, proc: &mut Process, cmd_ptr: usize) -> HandlerResult {
        let cmd_line = self.cstr(cmd_ptr)?;
        match self.procs.exec(&cmd_line) {
            Some(code) => {
                proc.exit_status = code;
                Ok(i64::from(code))
            }
            // The old image is gone and no new one loaded; nothing to
            // return into.
            None => Err(Control::Exit(FATAL_STATUS)),
        }
    }

    fn sys_wait(&self, pid: Pid) -> HandlerResult {
        match self.procs.wait(pid) {
            Some(status) => Ok(i64::from(status)),
            None => Ok(FAILURE),
        }
    }

    fn sys_create(&self, name_ptr: usize, initial_size: usize) -> HandlerResult {
        if name_ptr == 0 {
            return Ok(0);
        }
        let name = self.cstr(name_ptr)?;
        if name.is_empty() {
            return Ok(0);
        }
        let _io = self.io_lock.lock();
        Ok(self.fs.create(&name, initial_size) as i64)
    }

    fn sys_remove(&self, name_ptr: usize) -> HandlerResult {
        if name_ptr == 0 {
            return Ok(0);
        }
        let name = self.cstr(name_ptr)?;
        let _io = self.io_lock.lock();
        Ok(self.fs.remove(&name) as i64)
    }

    fn sys_open(&self, proc: &mut Process, name_ptr: usize) -> HandlerResult {
        if name_ptr == 0 {
            return Ok(FAILURE);
        }
        let name = self.cstr(name_ptr)?;

        let file = {
            let _io = self.io_lock.lock();
            let file = match self.fs.open(&name) {
                Some(file) => file,
                None => return Ok(FAILURE),
            };
            // A running program must not rewrite its own executable.
            if name == proc.name {
                file.deny_write();
            }
            file
        };

        let fd = self.descriptors.next();
        if proc.fds.insert(fd, file.clone()).is_err() {
            // No entry, no descriptor: release the fresh handle so the
            // open does not leak.
            let _io = self.io_lock.lock();
            drop(file);
            return Ok(FAILURE);
        }
        Ok(i64::from(fd.0))
    }

    fn sys_filesize(&self, proc: &Process, fd: Fd) -> HandlerResult {
        match proc.fds.lookup(fd) {
            Some(file) => {
                let _io = self.io_lock.lock();
                Ok(file.len() as i64)
            }
            None => Ok(FAILURE),
        }
    }

    fn sys_read(&self, proc: &Process, fd: Fd, buf_ptr: usize, size: usize) -> HandlerResult {
        let mut buf = self.user_dst(buf_ptr, size)?;

        if fd == Fd::STDIN {
            let _io = self.io_lock.lock();
            for byte in buf.as_bytes_mut() {
                *byte = self.console.read_char();
            }
            return Ok(size as i64);
        }
        if fd == Fd::STDOUT {
            return Err(self.fatal("read from stdout"));
        }
        match proc.fds.lookup(fd) {
            Some(file) => {
                let _io = self.io_lock.lock();
                Ok(file.read(buf.as_bytes_mut()) as i64)
            }
            None => Err(self.fatal("read on unknown descriptor")),
        }
    }

    fn sys_write(&self, proc: &Process, fd: Fd, buf_ptr: usize, size: usize) -> HandlerResult {
        let buf = self.user_src(buf_ptr, size)?;

        if fd == Fd::STDOUT {
            let _io = self.io_lock.lock();
            self.console.write_buffer(buf.as_bytes());
            // The console never reports truncation; a stdout write
            // "succeeds" with the requested size.
            return Ok(size as i64);
        }
        if fd == Fd::STDIN {
            return Ok(FAILURE);
        }
        match proc.fds.lookup(fd) {
            Some(file) => {
                let _io = self.io_lock.lock();
                Ok(file.write(buf.as_bytes()) as i64)
            }
            None => Ok(FAILURE),
        }
    }

    fn sys_seek(&self, proc: &Process, fd: Fd, pos: usize) -> HandlerResult {
        // Unknown descriptors are a no-op, not a kill: seek has no error
        // channel to report through.
        if let Some(file) = proc.fds.lookup(fd) {
            let _io = self.io_lock.lock();
            file.seek(pos);
        }
        Ok(0)
    }

    fn sys_tell(&self, proc: &Process, fd: Fd) -> HandlerResult {
        match proc.fds.lookup(fd) {
            Some(file) => {
                let _io = self.io_lock.lock();
                Ok(file.tell() as i64)
            }
            None => Ok(FAILURE),
        }
    }

    fn sys_close(&self, proc: &mut Process, fd: Fd) -> HandlerResult {
        match proc.fds.remove(fd) {
            Some(file) => {
                let _io = self.io_lock.lock();
                drop(file);
                Ok(0)
            }
            None => Err(self.fatal("close on unknown descriptor")),
        }
    }

    fn sys_dup2(&self, proc: &mut Process, old: Fd, new: Fd) -> HandlerResult {
        // Descriptors 0 and 1 stay the console and never become table
        // entries; a handler resolving them through the table would split
        // their identity (read from the console, filesize from a file).
        if new.is_console() {
            return Ok(FAILURE);
        }
        // Console descriptors are not table entries, so old = 0/1 fails
        // here like any other unbound descriptor.
        let file = match proc.fds.lookup(old) {
            Some(file) => file,
            None => return Ok(FAILURE),
        };
        if new == old {
            return Ok(i64::from(new.0));
        }

        // Secure the room for the new binding before the old one is
        // touched; a failed dup2 must leave `new` bound as it was.
        if proc.fds.reserve().is_err() {
            return Ok(FAILURE);
        }

        // Rebinding an open descriptor releases its old handle first,
        // exactly once.
        if let Some(prev) = proc.fds.remove(new) {
            let _io = self.io_lock.lock();
            drop(prev);
        }

        // The clone shares the open-file description: position and
        // deny-write state move together for old and new.
        if proc.fds.insert(new, file).is_err() {
            return Ok(FAILURE);
        }
        Ok(i64::from(new.0))
    }

    // ---- argument helpers ----------------------------------------------

    fn cstr(&self, ptr: usize) -> Result<String, Control> {
        validate::user_cstr(&self.user_span, ptr).map_err(|fault| self.reject(fault))
    }

    fn user_src(&self, ptr: usize, len: usize) -> Result<UserBuffer, Control> {
        validate::user_buffer(&self.user_span, ptr, len).map_err(|fault| self.reject(fault))
    }

    fn user_dst(&self, ptr: usize, len: usize) -> Result<UserBufferMut, Control> {
        validate::user_buffer_mut(&self.user_span, ptr, len).map_err(|fault| self.reject(fault))
    }

    fn reject(&self, fault: Fault) -> Control {
        log::warn!("syscall argument rejected: {}", fault);
        Control::Exit(FATAL_STATUS)
    }

    fn fatal(&self, why: &str) -> Control {
        log::warn!("fatal syscall misuse: {}", why);
        Control::Exit(FATAL_STATUS)
    }
}
