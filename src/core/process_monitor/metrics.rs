use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner sentinel used when the account of a process cannot be read
pub const UNKNOWN_OWNER: &str = "N/A";

/// Lifecycle state of a process as reported by the OS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Idle,
    Stopped,
    Zombie,
    Dead,
    #[default]
    Unknown,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Idle => "idle",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::Unknown => "unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One process at sample time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub owner: String,
    /// Normalized by logical core count; may exceed 100 on short bursts
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub memory_percent: f64,
    pub thread_count: usize,
    pub status: ProcessStatus,
    pub start_time: u64, // Unix timestamp
    pub is_protected: bool,
    pub exe: Option<String>,
}

/// Processes sharing a normalized executable name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub name: String,
    pub member_pids: Vec<u32>,
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub memory_percent: f64,
    pub process_count: usize,
    pub status: ProcessStatus,
    pub is_closeable: bool,
    /// Executable path of the first member that reported one
    pub exe: Option<String>,
}

/// Detailed view of a single process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    pub name: String,
    pub owner: String,
    pub status: ProcessStatus,
    pub start_time: u64,
    pub exe: Option<String>,
    pub cwd: Option<String>,
    pub cmdline: Vec<String>,
    pub memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub thread_count: usize,
    pub is_protected: bool,
}

/// Result of one sampling pass.
///
/// An empty list with `degraded == true` means the pass did not finish in time;
/// it never means the system has no processes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    pub processes: Vec<ProcessRecord>,
    pub degraded: bool,
}

impl SampleResult {
    pub fn degraded() -> Self {
        Self {
            processes: Vec::new(),
            degraded: true,
        }
    }
}

/// Sample plus application view, as published by the poller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: i64, // Unix timestamp
    pub processes: Vec<ProcessRecord>,
    pub apps: Vec<ApplicationRecord>,
    pub degraded: bool,
}
