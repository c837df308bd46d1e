//! `sysinfo`-backed process directory.
//!
//! Enumeration shares one `System` behind a mutex so CPU counters and the
//! process table are refreshed incrementally. Handles returned by `resolve`
//! and lookups done by `inspect` use their own `System` and never touch the
//! shared one, so lifecycle operations do not contend with sampling.

use parking_lot::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, Pid, Process, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, Signal, System, UpdateKind, Users,
};

#[cfg(windows)]
use super::thread_control;
use crate::core::process_monitor::{
    Attr, LiveProcess, ProbeError, ProcessDetails, ProcessDirectory, ProcessHandle, ProcessIter,
    ProcessStatus, RawProcess, SignalKind, UNKNOWN_OWNER,
};

const DEFAULT_EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct SysinfoDirectory {
    system: Mutex<System>,
    logical_cores: usize,
    total_memory: u64,
    exit_poll_interval: Duration,
}

impl SysinfoDirectory {
    pub fn new() -> Self {
        let host = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        Self {
            system: Mutex::new(System::new()),
            logical_cores: host.cpus().len().max(1),
            total_memory: host.total_memory(),
            exit_poll_interval: DEFAULT_EXIT_POLL_INTERVAL,
        }
    }

    /// How often handles re-check the process table while waiting for exit
    pub fn with_exit_poll_interval(mut self, interval: Duration) -> Self {
        self.exit_poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}

impl Default for SysinfoDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessDirectory for SysinfoDirectory {
    fn enumerate(&self, attrs: &[Attr]) -> ProcessIter<'_> {
        let users = attrs
            .contains(&Attr::Owner)
            .then(Users::new_with_refreshed_list);

        let mut system = self.system.lock();
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind(attrs));

        let items: Vec<_> = system
            .processes()
            .values()
            // Linux lists threads alongside processes
            .filter(|process| process.thread_kind().is_none())
            .map(|process| {
                let raw = raw_process(process, users.as_ref());
                if raw.name.is_empty() {
                    Err(ProbeError::AccessDenied)
                } else {
                    Ok(raw)
                }
            })
            .collect();

        Box::new(items.into_iter())
    }

    fn resolve(&self, pid: u32) -> Result<Box<dyn ProcessHandle>, ProbeError> {
        let handle = SysinfoHandle::open(pid, self.exit_poll_interval)?;
        Ok(Box::new(handle))
    }

    fn inspect(&self, pid: u32) -> Result<ProcessDetails, ProbeError> {
        let sys_pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::everything(),
        );

        let process = system.process(sys_pid).ok_or(ProbeError::NoSuchProcess)?;
        let users = Users::new_with_refreshed_list();

        Ok(ProcessDetails {
            pid,
            parent_pid: process.parent().map(|parent| parent.as_u32()),
            name: process.name().to_string_lossy().to_string(),
            owner: owner_name(process, &users).unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
            status: map_status(process),
            start_time: process.start_time(),
            exe: process.exe().map(|path| path.display().to_string()),
            cwd: process.cwd().map(|path| path.display().to_string()),
            cmdline: process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().to_string())
                .collect(),
            memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            thread_count: thread_count(process).unwrap_or(0),
            is_protected: false,
        })
    }

    fn logical_cores(&self) -> usize {
        self.logical_cores
    }

    fn total_memory(&self) -> u64 {
        self.total_memory
    }
}

/// Handle to one process, backed by a private `System`
pub struct SysinfoHandle {
    pid: Pid,
    name: String,
    start_time: u64,
    system: System,
    exit_poll_interval: Duration,
}

impl SysinfoHandle {
    fn open(pid: u32, exit_poll_interval: Duration) -> Result<Self, ProbeError> {
        let mut handle = Self {
            pid: Pid::from_u32(pid),
            name: String::new(),
            start_time: 0,
            system: System::new(),
            exit_poll_interval,
        };

        let live = handle.refresh()?;
        handle.name = live.name;
        handle.start_time = live.start_time;
        Ok(handle)
    }

    /// Still present, not a zombie, and not replaced by a new process
    fn is_alive(&mut self) -> bool {
        match self.refresh() {
            Ok(live) => live.start_time == self.start_time,
            Err(_) => false,
        }
    }
}

impl ProcessHandle for SysinfoHandle {
    fn pid(&self) -> u32 {
        self.pid.as_u32()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn start_time(&self) -> u64 {
        self.start_time
    }

    fn refresh(&mut self) -> Result<LiveProcess, ProbeError> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing(),
        );

        let process = self
            .system
            .process(self.pid)
            .ok_or(ProbeError::NoSuchProcess)?;

        match map_status(process) {
            ProcessStatus::Zombie => Err(ProbeError::Zombie),
            ProcessStatus::Dead => Err(ProbeError::NoSuchProcess),
            _ => Ok(LiveProcess {
                name: process.name().to_string_lossy().to_string(),
                start_time: process.start_time(),
            }),
        }
    }

    fn signal(&mut self, kind: SignalKind) -> Result<(), ProbeError> {
        let process = self
            .system
            .process(self.pid)
            .ok_or(ProbeError::NoSuchProcess)?;

        let delivered = match kind {
            // Platforms without SIGTERM fall back to a hard kill
            SignalKind::Terminate => process
                .kill_with(Signal::Term)
                .or_else(|| Some(process.kill())),
            SignalKind::Kill => Some(process.kill()),
            #[cfg(windows)]
            SignalKind::Suspend => return thread_control::suspend_process(self.pid.as_u32()),
            #[cfg(windows)]
            SignalKind::Resume => return thread_control::resume_process(self.pid.as_u32()),
            #[cfg(not(windows))]
            SignalKind::Suspend => process.kill_with(Signal::Stop),
            #[cfg(not(windows))]
            SignalKind::Resume => process.kill_with(Signal::Continue),
        };

        match delivered {
            Some(true) => Ok(()),
            None => Err(ProbeError::Unsupported),
            Some(false) if self.is_alive() => Err(ProbeError::AccessDenied),
            Some(false) => Err(ProbeError::NoSuchProcess),
        }
    }

    fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            if !self.is_alive() {
                return true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            thread::sleep(remaining.min(self.exit_poll_interval));
        }
    }
}

fn refresh_kind(attrs: &[Attr]) -> ProcessRefreshKind {
    attrs
        .iter()
        .fold(ProcessRefreshKind::nothing(), |kind, attr| match attr {
            Attr::Owner => kind.with_user(UpdateKind::OnlyIfNotSet),
            Attr::Cpu => kind.with_cpu(),
            Attr::Memory => kind.with_memory(),
            Attr::Threads => kind.with_tasks(),
            Attr::Exe => kind.with_exe(UpdateKind::OnlyIfNotSet),
        })
}

fn raw_process(process: &Process, users: Option<&Users>) -> RawProcess {
    RawProcess {
        pid: process.pid().as_u32(),
        name: process.name().to_string_lossy().to_string(),
        owner: users.and_then(|users| owner_name(process, users)),
        cpu_time: Duration::from_millis(process.accumulated_cpu_time()),
        start_time: process.start_time(),
        memory_bytes: process.memory(),
        thread_count: thread_count(process),
        status: map_status(process),
        exe: process.exe().map(|path| path.display().to_string()),
    }
}

fn owner_name(process: &Process, users: &Users) -> Option<String> {
    let uid = process.user_id()?;
    users
        .get_user_by_id(uid)
        .map(|user| user.name().to_string())
}

fn thread_count(process: &Process) -> Option<usize> {
    // The task list includes the main thread
    process.tasks().map(|tasks| tasks.len().max(1))
}

fn map_status(process: &Process) -> ProcessStatus {
    match process.status() {
        sysinfo::ProcessStatus::Run => ProcessStatus::Running,
        sysinfo::ProcessStatus::Sleep => ProcessStatus::Sleeping,
        sysinfo::ProcessStatus::Idle => ProcessStatus::Idle,
        sysinfo::ProcessStatus::Stop => ProcessStatus::Stopped,
        sysinfo::ProcessStatus::Zombie => ProcessStatus::Zombie,
        sysinfo::ProcessStatus::Dead => ProcessStatus::Dead,
        _ => ProcessStatus::Unknown,
    }
}
