//! Windowed CPU percentage from cumulative CPU-time counters.
//!
//! The OS reports how much CPU time a process has consumed since it started.
//! A percentage needs two readings, so the tracker keeps the previous reading
//! per process identity and turns each new one into
//! `100 * cpu_delta / wall_delta / logical_cores`.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Key used to correlate observations of the same process.
///
/// Pids are recycled by the OS; pairing the pid with the start time keeps a
/// recycled pid from inheriting the baseline of the process that owned it before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub start_time: u64,
}

impl ProcessIdentity {
    pub fn new(pid: u32, start_time: u64) -> Self {
        Self { pid, start_time }
    }
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    cpu_time: Duration,
    observed_at: Instant,
}

pub struct CpuLoadTracker {
    logical_cores: usize,
    baselines: Mutex<HashMap<ProcessIdentity, Baseline>>,
}

impl CpuLoadTracker {
    pub fn new(logical_cores: usize) -> Self {
        Self {
            logical_cores: logical_cores.max(1),
            baselines: Mutex::new(HashMap::new()),
        }
    }

    pub fn logical_cores(&self) -> usize {
        self.logical_cores
    }

    /// Start a sampling pass. Baselines not observed during the pass are
    /// evicted when it finishes.
    pub fn begin_pass(&self) -> TrackerPass<'_> {
        TrackerPass {
            tracker: self,
            started: Instant::now(),
            seen: HashSet::new(),
        }
    }

    /// Number of identities with a stored baseline
    pub fn tracked(&self) -> usize {
        self.baselines.lock().len()
    }

    /// Record `cpu_time` for `identity` as read at `at` and return the CPU
    /// percentage since the previous reading. The first reading of an
    /// identity returns 0.0.
    pub fn observe_at(&self, identity: ProcessIdentity, cpu_time: Duration, at: Instant) -> f64 {
        let mut baselines = self.baselines.lock();

        let Some(prev) = baselines.get(&identity).copied() else {
            baselines.insert(
                identity,
                Baseline {
                    cpu_time,
                    observed_at: at,
                },
            );
            return 0.0;
        };

        // An older read from an overlapping pass must not replace a newer baseline
        if at <= prev.observed_at {
            return 0.0;
        }

        baselines.insert(
            identity,
            Baseline {
                cpu_time,
                observed_at: at,
            },
        );

        let wall_secs = at.duration_since(prev.observed_at).as_secs_f64();
        if wall_secs <= 0.0 {
            return 0.0;
        }
        // Counter resets saturate to zero
        let cpu_secs = cpu_time.saturating_sub(prev.cpu_time).as_secs_f64();

        (100.0 * cpu_secs / wall_secs / self.logical_cores as f64).max(0.0)
    }

    fn evict_stale(&self, seen: &HashSet<ProcessIdentity>, pass_started: Instant) {
        let mut baselines = self.baselines.lock();
        let before = baselines.len();
        // Entries refreshed by a newer overlapping pass are kept
        baselines.retain(|identity, baseline| {
            seen.contains(identity) || baseline.observed_at > pass_started
        });
        let evicted = before - baselines.len();
        if evicted > 0 {
            log::trace!("Evicted {} stale CPU baselines", evicted);
        }
    }
}

/// One sampling pass over the tracker
pub struct TrackerPass<'a> {
    tracker: &'a CpuLoadTracker,
    started: Instant,
    seen: HashSet<ProcessIdentity>,
}

impl TrackerPass<'_> {
    pub fn observe(&mut self, identity: ProcessIdentity, cpu_time: Duration) -> f64 {
        self.observe_at(identity, cpu_time, Instant::now())
    }

    pub fn observe_at(
        &mut self,
        identity: ProcessIdentity,
        cpu_time: Duration,
        at: Instant,
    ) -> f64 {
        self.seen.insert(identity);
        self.tracker.observe_at(identity, cpu_time, at)
    }

    pub fn finish(self) {
        self.tracker.evict_stale(&self.seen, self.started);
    }
}
