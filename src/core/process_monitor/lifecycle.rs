//! Terminate, suspend and resume with protected-process enforcement.
//!
//! Every operation resolves the pid, checks the protection policy, re-reads
//! the live process right before signalling, and only then acts. Failures are
//! returned to the caller as-is and never retried.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::apps::normalize_app_name;
use super::directory::{ProbeError, ProcessDirectory, ProcessHandle, SignalKind};
use super::guard::ProcessGuard;
use super::metrics::{ApplicationRecord, ProcessDetails};
use crate::error::{Result, TaskError};

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// How long `terminate` waits for the process to leave the process table
    pub terminate_wait: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            terminate_wait: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Terminate,
    Kill,
    Suspend,
    Resume,
}

impl LifecycleAction {
    fn signal(self) -> SignalKind {
        match self {
            LifecycleAction::Terminate => SignalKind::Terminate,
            LifecycleAction::Kill => SignalKind::Kill,
            LifecycleAction::Suspend => SignalKind::Suspend,
            LifecycleAction::Resume => SignalKind::Resume,
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.signal(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The action took effect and, for termination, the process is gone
    Confirmed,
    /// The signal was delivered but exit was not observed within the wait
    Pending,
}

/// Successful lifecycle operation
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub pid: u32,
    pub name: String,
    pub action: LifecycleAction,
    pub outcome: Outcome,
    pub message: String,
}

/// Result of closing every process of an application
#[derive(Debug, Clone, Serialize)]
pub struct CloseReport {
    pub name: String,
    pub terminated: Vec<Ack>,
    pub failures: Vec<CloseFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloseFailure {
    pub pid: u32,
    pub reason: String,
}

pub struct LifecycleController {
    directory: Arc<dyn ProcessDirectory>,
    guard: Arc<ProcessGuard>,
    config: LifecycleConfig,
}

impl LifecycleController {
    pub fn new(directory: Arc<dyn ProcessDirectory>, guard: Arc<ProcessGuard>) -> Self {
        Self::with_config(directory, guard, LifecycleConfig::default())
    }

    pub fn with_config(
        directory: Arc<dyn ProcessDirectory>,
        guard: Arc<ProcessGuard>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            directory,
            guard,
            config,
        }
    }

    /// Stop a process, gracefully unless `force` is set.
    ///
    /// Exit not observed within the configured wait is still a success with
    /// outcome [`Outcome::Pending`]: the signal was delivered.
    pub fn terminate(&self, pid: u32, force: bool) -> Result<Ack> {
        let action = if force {
            LifecycleAction::Kill
        } else {
            LifecycleAction::Terminate
        };

        let mut handle = self.signal_checked(pid, action)?;
        let exited = handle.wait(self.config.terminate_wait);
        Ok(termination_ack(handle.as_ref(), action, exited))
    }

    pub fn suspend(&self, pid: u32) -> Result<Ack> {
        let handle = self.signal_checked(pid, LifecycleAction::Suspend)?;
        Ok(Ack {
            pid,
            name: handle.name().to_string(),
            action: LifecycleAction::Suspend,
            outcome: Outcome::Confirmed,
            message: format!("Process {} suspended successfully", pid),
        })
    }

    /// Resume a suspended process. Resuming a running process is not an error.
    pub fn resume(&self, pid: u32) -> Result<Ack> {
        let handle = self.signal_checked(pid, LifecycleAction::Resume)?;
        Ok(Ack {
            pid,
            name: handle.name().to_string(),
            action: LifecycleAction::Resume,
            outcome: Outcome::Confirmed,
            message: format!("Process {} resumed successfully", pid),
        })
    }

    /// Gracefully terminate every member of an application.
    ///
    /// All members are signalled first, then awaited against one shared
    /// deadline. Members that already exited count as failures with a
    /// not-found reason.
    pub fn close_application(&self, app: &ApplicationRecord) -> Result<CloseReport> {
        if !app.is_closeable {
            let pid = app.member_pids.first().copied().unwrap_or_default();
            return Err(TaskError::forbidden(pid, app.name.as_str(), "close"));
        }

        let action = LifecycleAction::Terminate;
        let mut signalled = Vec::new();
        let mut failures = Vec::new();

        for &pid in &app.member_pids {
            match self.signal_checked(pid, action) {
                Ok(handle) => signalled.push(handle),
                Err(e) => failures.push(CloseFailure {
                    pid,
                    reason: e.to_string(),
                }),
            }
        }

        let deadline = Instant::now() + self.config.terminate_wait;
        let terminated = signalled
            .into_iter()
            .map(|mut handle| {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let exited = handle.wait(remaining);
                termination_ack(handle.as_ref(), action, exited)
            })
            .collect();

        Ok(CloseReport {
            name: normalize_app_name(&app.name).to_string(),
            terminated,
            failures,
        })
    }

    /// Read the extended attributes of one process
    pub fn inspect(&self, pid: u32) -> Result<ProcessDetails> {
        let mut details = self
            .directory
            .inspect(pid)
            .map_err(|e| classify(e, pid, "inspect"))?;
        details.is_protected = self.guard.is_protected(&details.name, pid);
        Ok(details)
    }

    /// Resolve, check protection, re-validate, then deliver the signal
    fn signal_checked(&self, pid: u32, action: LifecycleAction) -> Result<Box<dyn ProcessHandle>> {
        let verb = action.to_string();

        let mut handle = self
            .directory
            .resolve(pid)
            .map_err(|e| classify(e, pid, &verb))?;

        if self.guard.is_protected(handle.name(), pid) {
            log::warn!("Refusing to {} protected process {} ({})", verb, handle.name(), pid);
            return Err(TaskError::forbidden(pid, handle.name(), verb));
        }

        // The pid may have been recycled since resolution
        let live = handle.refresh().map_err(|e| classify(e, pid, &verb))?;
        if live.start_time != handle.start_time() {
            log::debug!("Process {} was replaced before it could be signalled", pid);
            return Err(TaskError::not_found(pid));
        }
        if self.guard.is_protected(&live.name, pid) {
            return Err(TaskError::forbidden(pid, live.name, verb));
        }

        handle
            .signal(action.signal())
            .map_err(|e| classify(e, pid, &verb))?;
        log::info!("Sent {} to {} (PID: {})", verb, handle.name(), pid);

        Ok(handle)
    }
}

fn termination_ack(handle: &dyn ProcessHandle, action: LifecycleAction, exited: bool) -> Ack {
    let pid = handle.pid();
    let name = handle.name().to_string();

    if exited {
        Ack {
            message: format!("Process {} (PID: {}) terminated successfully", name, pid),
            pid,
            name,
            action,
            outcome: Outcome::Confirmed,
        }
    } else {
        Ack {
            message: format!("Process {} termination initiated (may take time)", pid),
            pid,
            name,
            action,
            outcome: Outcome::Pending,
        }
    }
}

fn classify(err: ProbeError, pid: u32, action: &str) -> TaskError {
    match err {
        ProbeError::NoSuchProcess | ProbeError::Zombie => TaskError::not_found(pid),
        ProbeError::AccessDenied => TaskError::access_denied(pid, action),
        ProbeError::Unsupported => {
            TaskError::unsupported(format!("cannot {} process {}", action, pid))
        }
    }
}
