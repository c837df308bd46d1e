use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::apps::aggregate;
use super::cpu_tracker::{CpuLoadTracker, ProcessIdentity};
use super::directory::{Attr, ProcessDirectory};
use super::guard::ProcessGuard;
use super::metrics::{ProcessRecord, SampleResult, Snapshot, UNKNOWN_OWNER};

/// Pid reserved by every supported OS for the idle/swapper pseudo-process
const RESERVED_PID: u32 = 0;

/// Configuration for process sampling
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub timeout: Duration,
    /// Cap on enumeration workers alive at once, including abandoned ones
    pub max_outstanding_workers: usize,
    pub attributes: Vec<Attr>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            max_outstanding_workers: 4,
            attributes: Attr::ALL.to_vec(),
        }
    }
}

/// Runs enumeration passes under a wall-clock timeout.
///
/// Each pass runs on a blocking worker. The caller waits for the worker or
/// the deadline, whichever comes first. A worker that misses the deadline is
/// left to finish on its own and its result is dropped, so the number of
/// workers alive at once is capped by a semaphore.
pub struct BoundedSampler {
    directory: Arc<dyn ProcessDirectory>,
    tracker: Arc<CpuLoadTracker>,
    guard: Arc<ProcessGuard>,
    workers: Arc<Semaphore>,
    config: SamplerConfig,
}

impl BoundedSampler {
    /// Create a sampler with the built-in protection policy and default configuration
    pub fn new(directory: Arc<dyn ProcessDirectory>) -> Self {
        Self::with_config(
            directory,
            Arc::new(ProcessGuard::new()),
            SamplerConfig::default(),
        )
    }

    pub fn with_config(
        directory: Arc<dyn ProcessDirectory>,
        guard: Arc<ProcessGuard>,
        config: SamplerConfig,
    ) -> Self {
        let tracker = Arc::new(CpuLoadTracker::new(directory.logical_cores()));
        let workers = Arc::new(Semaphore::new(config.max_outstanding_workers.max(1)));

        Self {
            directory,
            tracker,
            guard,
            workers,
            config,
        }
    }

    pub fn tracker(&self) -> &Arc<CpuLoadTracker> {
        &self.tracker
    }

    pub fn guard(&self) -> &Arc<ProcessGuard> {
        &self.guard
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample with the configured timeout
    pub async fn sample_default(&self) -> SampleResult {
        self.sample(self.config.timeout).await
    }

    /// Run one enumeration pass bounded by `timeout`.
    ///
    /// Never fails: a pass that times out, panics, or cannot get a worker
    /// returns an empty result flagged `degraded`.
    pub async fn sample(&self, timeout: Duration) -> SampleResult {
        let permit = match Arc::clone(&self.workers).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                log::warn!(
                    "All {} sampling workers are still busy; returning degraded sample",
                    self.config.max_outstanding_workers
                );
                return SampleResult::degraded();
            }
        };

        let directory = Arc::clone(&self.directory);
        let tracker = Arc::clone(&self.tracker);
        let guard = Arc::clone(&self.guard);
        let attributes = self.config.attributes.clone();

        let worker = tokio::task::spawn_blocking(move || {
            // Held until the pass ends, even if the caller stopped waiting
            let _permit = permit;
            run_pass(directory.as_ref(), &tracker, &guard, &attributes)
        });

        match tokio::time::timeout(timeout, worker).await {
            Ok(Ok(processes)) => {
                log::debug!("Sampled {} processes", processes.len());
                SampleResult {
                    processes,
                    degraded: false,
                }
            }
            Ok(Err(e)) => {
                log::error!("Sampling worker failed: {}", e);
                SampleResult::degraded()
            }
            Err(_) => {
                log::warn!(
                    "Sampling pass exceeded {:?}; returning degraded sample",
                    timeout
                );
                SampleResult::degraded()
            }
        }
    }

    /// Sample and group into applications in one step
    pub async fn snapshot(&self, timeout: Duration) -> Snapshot {
        let sample = self.sample(timeout).await;
        let apps = aggregate(&sample.processes);

        Snapshot {
            timestamp: chrono::Utc::now().timestamp(),
            processes: sample.processes,
            apps,
            degraded: sample.degraded,
        }
    }
}

/// One full enumeration pass. Per-process failures are skipped.
fn run_pass(
    directory: &dyn ProcessDirectory,
    tracker: &CpuLoadTracker,
    guard: &ProcessGuard,
    attributes: &[Attr],
) -> Vec<ProcessRecord> {
    let total_memory = directory.total_memory();
    let track_cpu = attributes.contains(&Attr::Cpu);

    let mut pass = tracker.begin_pass();
    let mut seen_pids = HashSet::new();
    let mut processes = Vec::new();
    let mut skipped = 0usize;

    for item in directory.enumerate(attributes) {
        let raw = match item {
            Ok(raw) => raw,
            Err(e) => {
                skipped += 1;
                log::trace!("Skipping process during enumeration: {}", e);
                continue;
            }
        };

        if raw.pid == RESERVED_PID || !seen_pids.insert(raw.pid) {
            continue;
        }

        let cpu_percent = if track_cpu {
            pass.observe(ProcessIdentity::new(raw.pid, raw.start_time), raw.cpu_time)
        } else {
            0.0
        };

        let memory_percent = if total_memory > 0 {
            raw.memory_bytes as f64 / total_memory as f64 * 100.0
        } else {
            0.0
        };

        let is_protected = guard.is_protected(&raw.name, raw.pid);

        processes.push(ProcessRecord {
            pid: raw.pid,
            owner: raw.owner.unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
            cpu_percent,
            memory_bytes: raw.memory_bytes,
            memory_percent,
            thread_count: raw.thread_count.unwrap_or(0),
            status: raw.status,
            start_time: raw.start_time,
            is_protected,
            name: raw.name,
            exe: raw.exe,
        });
    }

    pass.finish();

    if skipped > 0 {
        log::debug!("Skipped {} processes that could not be read", skipped);
    }

    processes
}
