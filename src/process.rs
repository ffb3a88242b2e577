//! Process Context and Process-Management Collaborator
//!
//! The syscall layer owns each process's *syscall context*: its descriptor
//! table, its exit-status cell, and the trap-frame snapshot a later `fork`
//! rebuilds the child from. Creating, scheduling and reaping processes is
//! the collaborator's job, behind [`ProcessManager`].
//!
//! # Security Considerations
//! - The context is touched only by the owning process's kernel thread, so
//!   it needs no lock of its own
//! - On termination the kernel releases every descriptor in the table
//!   (dropping the table drops the handles)

use alloc::string::String;

use crate::fd::FdTable;
use crate::trap::TrapFrame;

/// Process identifier.
///
/// Newtype so a pid cannot be confused with a descriptor or a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Pid(pub u32);

impl core::fmt::Display for Pid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-process syscall context.
#[derive(Debug)]
pub struct Process {
    /// Process id, issued by the process manager.
    pub pid: Pid,
    /// Program name, as passed to fork/exec. Compared against opened file
    /// names to deny writes to the running executable.
    pub name: String,
    /// Exit status cell, recorded by the dispatcher on termination and by
    /// a successful exec. Read by the parent through `wait`.
    pub exit_status: i32,
    /// Open file descriptors.
    pub fds: FdTable,
    /// Frame snapshot taken before every dispatch; `fork` reconstructs the
    /// child's user context from it.
    pub saved_frame: TrapFrame,
}

impl Process {
    /// Fresh context for a newly created process.
    pub fn new(pid: Pid, name: String) -> Self {
        Self {
            pid,
            name,
            exit_status: 0,
            fds: FdTable::new(),
            saved_frame: TrapFrame::zeroed(),
        }
    }
}

/// Process-management collaborator (fork/exec/wait mechanics).
///
/// Blocking behavior is the implementation's: `fork` must not return until
/// the child's startup has either committed or failed (a one-shot signal
/// per child, consumed once), `wait` blocks until the child terminates.
pub trait ProcessManager: Send + Sync {
    /// Clone the calling process. The child resumes from `parent_frame`
    /// with a return value of 0 and a descriptor table resolving the same
    /// descriptors to equivalent handles.
    ///
    /// Returns the child's pid, or `None` if creation or the child's own
    /// startup failed.
    fn fork(&self, name: &str, parent_frame: &TrapFrame) -> Option<Pid>;

    /// Replace the calling process's image with `cmd_line`. Returns the
    /// load result code on success, `None` if the image could not be
    /// loaded (the caller is then terminated with status -1).
    fn exec(&self, cmd_line: &str) -> Option<i32>;

    /// Block until child `pid` terminates and return its exit status, or
    /// `None` if `pid` is not an un-waited child of the caller.
    fn wait(&self, pid: Pid) -> Option<i32>;
}
