// In-memory process directory used by the integration tests

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use taskpro::core::process_monitor::{
    Attr, LiveProcess, ProbeError, ProcessDetails, ProcessDirectory, ProcessHandle, ProcessIter,
    ProcessStatus, RawProcess, SignalKind,
};

pub const TOTAL_MEMORY: u64 = 16 * 1024 * 1024 * 1024;

pub fn raw(pid: u32, name: &str, owner: &str) -> RawProcess {
    RawProcess {
        pid,
        name: name.to_string(),
        owner: Some(owner.to_string()),
        cpu_time: Duration::ZERO,
        start_time: 1_700_000_000 + pid as u64,
        memory_bytes: 64 * 1024 * 1024,
        thread_count: Some(4),
        status: ProcessStatus::Running,
        exe: Some(format!("/usr/bin/{}", name)),
    }
}

#[derive(Default)]
pub struct MockState {
    pub processes: Vec<RawProcess>,
    /// Yielded as failed items after the processes
    pub failures: Vec<ProbeError>,
    /// Signals to these pids are refused by the "OS"
    pub deny: HashSet<u32>,
    /// These pids ignore terminate and never exit
    pub stubborn: HashSet<u32>,
    /// These pids are replaced by a new process right after resolution
    pub recycle: HashSet<u32>,
    /// These pids report a different name once re-read after resolution
    pub rename: HashMap<u32, String>,
}

pub struct MockDirectory {
    pub state: Arc<Mutex<MockState>>,
    pub signals: Arc<AtomicUsize>,
    pub enumerations: AtomicUsize,
    enumerate_delay: Duration,
    cores: usize,
}

impl MockDirectory {
    pub fn new(processes: Vec<RawProcess>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                processes,
                ..MockState::default()
            })),
            signals: Arc::new(AtomicUsize::new(0)),
            enumerations: AtomicUsize::new(0),
            enumerate_delay: Duration::ZERO,
            cores: 1,
        }
    }

    /// Every enumeration blocks for `delay` before yielding anything
    pub fn stalled(delay: Duration) -> Self {
        Self {
            enumerate_delay: delay,
            ..Self::new(vec![raw(1234, "slow.exe", "alice")])
        }
    }

    pub fn signal_count(&self) -> usize {
        self.signals.load(Ordering::SeqCst)
    }

    pub fn status_of(&self, pid: u32) -> Option<ProcessStatus> {
        self.state
            .lock()
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .map(|p| p.status)
    }

    pub fn add_cpu_time(&self, pid: u32, delta: Duration) {
        let mut state = self.state.lock();
        if let Some(process) = state.processes.iter_mut().find(|p| p.pid == pid) {
            process.cpu_time += delta;
        }
    }
}

impl ProcessDirectory for MockDirectory {
    fn enumerate(&self, _attrs: &[Attr]) -> ProcessIter<'_> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if !self.enumerate_delay.is_zero() {
            thread::sleep(self.enumerate_delay);
        }

        let state = self.state.lock();
        let items: Vec<_> = state
            .processes
            .iter()
            .cloned()
            .map(Ok)
            .chain(state.failures.iter().copied().map(Err))
            .collect();
        Box::new(items.into_iter())
    }

    fn resolve(&self, pid: u32) -> Result<Box<dyn ProcessHandle>, ProbeError> {
        let state = self.state.lock();
        let process = state
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .ok_or(ProbeError::NoSuchProcess)?;

        Ok(Box::new(MockHandle {
            pid,
            name: process.name.clone(),
            start_time: process.start_time,
            state: Arc::clone(&self.state),
            signals: Arc::clone(&self.signals),
        }))
    }

    fn inspect(&self, pid: u32) -> Result<ProcessDetails, ProbeError> {
        let state = self.state.lock();
        let process = state
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .ok_or(ProbeError::NoSuchProcess)?;

        Ok(ProcessDetails {
            pid,
            name: process.name.clone(),
            owner: process.owner.clone().unwrap_or_default(),
            status: process.status,
            start_time: process.start_time,
            memory_bytes: process.memory_bytes,
            thread_count: process.thread_count.unwrap_or(0),
            ..ProcessDetails::default()
        })
    }

    fn logical_cores(&self) -> usize {
        self.cores
    }

    fn total_memory(&self) -> u64 {
        TOTAL_MEMORY
    }
}

pub struct MockHandle {
    pid: u32,
    name: String,
    start_time: u64,
    state: Arc<Mutex<MockState>>,
    signals: Arc<AtomicUsize>,
}

impl ProcessHandle for MockHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn start_time(&self) -> u64 {
        self.start_time
    }

    fn refresh(&mut self) -> Result<LiveProcess, ProbeError> {
        let state = self.state.lock();
        let process = state
            .processes
            .iter()
            .find(|p| p.pid == self.pid)
            .ok_or(ProbeError::NoSuchProcess)?;

        let start_time = if state.recycle.contains(&self.pid) {
            process.start_time + 1
        } else {
            process.start_time
        };

        let name = state
            .rename
            .get(&self.pid)
            .cloned()
            .unwrap_or_else(|| process.name.clone());

        Ok(LiveProcess { name, start_time })
    }

    fn signal(&mut self, kind: SignalKind) -> Result<(), ProbeError> {
        self.signals.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        if state.deny.contains(&self.pid) {
            return Err(ProbeError::AccessDenied);
        }
        let stubborn = state.stubborn.contains(&self.pid);

        let index = state
            .processes
            .iter()
            .position(|p| p.pid == self.pid)
            .ok_or(ProbeError::NoSuchProcess)?;

        match kind {
            SignalKind::Terminate if stubborn => {}
            SignalKind::Terminate | SignalKind::Kill => {
                state.processes.remove(index);
            }
            SignalKind::Suspend => state.processes[index].status = ProcessStatus::Stopped,
            SignalKind::Resume => state.processes[index].status = ProcessStatus::Running,
        }
        Ok(())
    }

    fn wait(&mut self, _timeout: Duration) -> bool {
        !self
            .state
            .lock()
            .processes
            .iter()
            .any(|p| p.pid == self.pid)
    }
}
