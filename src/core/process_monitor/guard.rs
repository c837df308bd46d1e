//! Protected-process policy.
//!
//! Protection is a pure function of `(name, pid)`. The name set is fixed when
//! the guard is built and never changes afterwards, so a guard can be shared
//! across threads without locking.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Processes with a pid at or below this value are always protected
pub const DEFAULT_RESERVED_PID_CEILING: u32 = 10;

/// Executables that lifecycle operations must never touch
pub const DEFAULT_PROTECTED_NAMES: &[&str] = &[
    // Windows core
    "system",
    "system idle process",
    "registry",
    "memory compression",
    "smss.exe",
    "csrss.exe",
    "wininit.exe",
    "services.exe",
    "lsass.exe",
    "lsaiso.exe",
    "winlogon.exe",
    "dwm.exe",
    "svchost.exe",
    "explorer.exe",
    "fontdrvhost.exe",
    "sihost.exe",
    "taskhostw.exe",
    "spoolsv.exe",
    "conhost.exe",
    // Unix core
    "init",
    "systemd",
    "kthreadd",
    "launchd",
    "kernel_task",
];

/// Accounts whose protected processes are hidden from the apps view
pub const SYSTEM_ACCOUNTS: &[&str] = &[
    "system",
    "nt authority\\system",
    "local service",
    "network service",
    "n/a",
    "root",
];

static STANDARD_GUARD: Lazy<ProcessGuard> = Lazy::new(ProcessGuard::new);

/// Protection check against the built-in policy
pub fn is_protected(name: &str, pid: u32) -> bool {
    STANDARD_GUARD.is_protected(name, pid)
}

/// True if `owner` is one of the system-account sentinels
pub fn is_system_account(owner: &str) -> bool {
    let owner = owner.trim();
    SYSTEM_ACCOUNTS
        .iter()
        .any(|account| account.eq_ignore_ascii_case(owner))
}

/// A process is hidden from the apps view only when it is protected AND runs
/// under a system account. Protected processes of real users stay visible.
pub fn is_hidden_from_apps(is_protected: bool, owner: &str) -> bool {
    is_protected && is_system_account(owner)
}

#[derive(Debug, Clone)]
pub struct ProcessGuard {
    names: HashSet<String>,
    reserved_pid_ceiling: u32,
}

impl ProcessGuard {
    /// Guard with the built-in name set and pid ceiling
    pub fn new() -> Self {
        Self {
            names: DEFAULT_PROTECTED_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            reserved_pid_ceiling: DEFAULT_RESERVED_PID_CEILING,
        }
    }

    /// Guard with additional protected names on top of the built-in set
    pub fn with_extra_names<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = Self::new();
        guard.names.extend(
            extra
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .filter(|name| !name.is_empty()),
        );
        guard
    }

    pub fn reserved_pid_ceiling(mut self, ceiling: u32) -> Self {
        self.reserved_pid_ceiling = ceiling;
        self
    }

    pub fn is_protected(&self, name: &str, pid: u32) -> bool {
        if pid <= self.reserved_pid_ceiling {
            return true;
        }
        self.names.contains(&name.trim().to_lowercase())
    }

    pub fn protected_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}
