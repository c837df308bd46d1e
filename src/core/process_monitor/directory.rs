//! OS-facing capabilities the engine consumes.
//!
//! The engine never lists processes itself. It asks a [`ProcessDirectory`] for
//! raw per-process attributes and for handles to individual processes.
//! Implementations live in the platform layer.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::metrics::{ProcessDetails, ProcessStatus};

/// Attributes a directory can be asked to resolve per process.
///
/// `pid`, `name` and `status` are always resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Owner,
    Cpu,
    Memory,
    Threads,
    Exe,
}

impl Attr {
    pub const ALL: [Attr; 5] = [
        Attr::Owner,
        Attr::Cpu,
        Attr::Memory,
        Attr::Threads,
        Attr::Exe,
    ];
}

/// Per-process read failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    #[error("process no longer exists")]
    NoSuchProcess,

    #[error("access denied")]
    AccessDenied,

    #[error("process is a zombie")]
    Zombie,

    #[error("operation not supported on this platform")]
    Unsupported,
}

/// Raw attributes of one process as read from the OS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: String,
    pub owner: Option<String>,
    /// Total CPU time consumed since process start
    pub cpu_time: Duration,
    pub start_time: u64,
    pub memory_bytes: u64,
    pub thread_count: Option<usize>,
    pub status: ProcessStatus,
    /// Path of the executable image, when readable
    pub exe: Option<String>,
}

/// Name and start time of a process as currently seen by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveProcess {
    pub name: String,
    pub start_time: u64,
}

/// Control signals understood by [`ProcessHandle::signal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Terminate,
    Kill,
    Suspend,
    Resume,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Terminate => "terminate",
            SignalKind::Kill => "kill",
            SignalKind::Suspend => "suspend",
            SignalKind::Resume => "resume",
        };
        f.write_str(name)
    }
}

pub type ProcessIter<'a> = Box<dyn Iterator<Item = Result<RawProcess, ProbeError>> + Send + 'a>;

/// Trait for process enumeration sources
pub trait ProcessDirectory: Send + Sync {
    /// Enumerate all live processes, resolving `attrs` for each.
    ///
    /// Each item fails independently; a failed item never ends the iteration.
    fn enumerate(&self, attrs: &[Attr]) -> ProcessIter<'_>;

    /// Look up a single live process by pid
    fn resolve(&self, pid: u32) -> Result<Box<dyn ProcessHandle>, ProbeError>;

    /// Read the extended attribute set of a single process
    fn inspect(&self, pid: u32) -> Result<ProcessDetails, ProbeError>;

    /// Number of schedulable hardware threads (at least 1)
    fn logical_cores(&self) -> usize;

    /// Total physical memory in bytes
    fn total_memory(&self) -> u64;
}

/// A single resolved process that can be signalled
pub trait ProcessHandle: Send {
    fn pid(&self) -> u32;

    /// Name observed at resolution time
    fn name(&self) -> &str;

    /// Start time observed at resolution time
    fn start_time(&self) -> u64;

    /// Re-read the live process behind this pid
    fn refresh(&mut self) -> Result<LiveProcess, ProbeError>;

    fn signal(&mut self, kind: SignalKind) -> Result<(), ProbeError>;

    /// Block until the process has left the process table or `timeout` elapsed.
    /// Returns true if it exited.
    fn wait(&mut self, timeout: Duration) -> bool;
}
