// Integration tests for bounded sampling

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use taskpro::core::process_monitor::{
    BoundedSampler, ProbeError, ProcessGuard, ProcessStatus, SamplerConfig,
};

use super::support::{raw, MockDirectory, TOTAL_MEMORY};

#[tokio::test]
async fn test_sample_skips_pid_zero_duplicates_and_failures() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(0, "System Idle Process", "SYSTEM"),
        raw(4321, "chrome.exe", "alice"),
        raw(4321, "chrome.exe", "alice"),
        raw(5000, "notepad.exe", "alice"),
    ]));
    directory.state.lock().failures = vec![
        ProbeError::AccessDenied,
        ProbeError::NoSuchProcess,
        ProbeError::Zombie,
    ];

    let sampler = BoundedSampler::new(directory.clone());
    let result = sampler.sample(Duration::from_secs(5)).await;

    assert!(!result.degraded);
    let pids: Vec<u32> = result.processes.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![4321, 5000]);

    let unique: HashSet<u32> = pids.iter().copied().collect();
    assert_eq!(unique.len(), pids.len());
}

#[tokio::test]
async fn test_first_pass_reports_zero_cpu_then_measures() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "chrome.exe", "alice")]));
    let sampler = BoundedSampler::new(directory.clone());

    let first = sampler.sample(Duration::from_secs(5)).await;
    assert_eq!(first.processes[0].cpu_percent, 0.0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    directory.add_cpu_time(4321, Duration::from_millis(50));

    let second = sampler.sample(Duration::from_secs(5)).await;
    let cpu = second.processes[0].cpu_percent;
    // 50ms of CPU over at least 100ms of wall time on one core
    assert!(cpu > 0.0, "expected measured load, got {}", cpu);
    assert!(cpu <= 50.0 + 1e-6, "load {} exceeds the possible maximum", cpu);
}

#[tokio::test]
async fn test_record_fields_are_filled() {
    let mut unowned = raw(7000, "mystery", "ignored");
    unowned.owner = None;
    unowned.thread_count = None;

    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "chrome.exe", "alice"), unowned]));
    let sampler = BoundedSampler::new(directory.clone());
    let result = sampler.sample(Duration::from_secs(5)).await;

    let chrome = &result.processes[0];
    assert_eq!(chrome.owner, "alice");
    assert_eq!(chrome.thread_count, 4);
    assert_eq!(chrome.status, ProcessStatus::Running);
    let expected = 64.0 * 1024.0 * 1024.0 / TOTAL_MEMORY as f64 * 100.0;
    assert!((chrome.memory_percent - expected).abs() < 1e-9);

    let mystery = &result.processes[1];
    assert_eq!(mystery.owner, "N/A");
}

#[tokio::test]
async fn test_protected_flag_follows_guard() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(5, "myapp.exe", "alice"),
        raw(4000, "explorer.exe", "alice"),
        raw(4001, "myapp.exe", "alice"),
    ]));
    let sampler = BoundedSampler::new(directory.clone());
    let result = sampler.sample(Duration::from_secs(5)).await;

    let flags: Vec<(u32, bool)> = result
        .processes
        .iter()
        .map(|p| (p.pid, p.is_protected))
        .collect();
    assert_eq!(flags, vec![(5, true), (4000, true), (4001, false)]);
}

#[tokio::test]
async fn test_tiny_timeout_returns_degraded_empty_result() {
    let directory = Arc::new(MockDirectory::stalled(Duration::from_millis(300)));
    let sampler = BoundedSampler::new(directory.clone());

    let result = sampler.sample(Duration::from_millis(1)).await;

    assert!(result.degraded);
    assert!(result.processes.is_empty());
}

#[tokio::test]
async fn test_exhausted_worker_cap_degrades_without_enumerating() {
    let directory = Arc::new(MockDirectory::stalled(Duration::from_millis(300)));
    let config = SamplerConfig {
        max_outstanding_workers: 1,
        ..SamplerConfig::default()
    };
    let sampler =
        BoundedSampler::with_config(directory.clone(), Arc::new(ProcessGuard::new()), config);

    let first = sampler.sample(Duration::from_millis(10)).await;
    assert!(first.degraded);

    // The first worker is still stuck in enumeration and holds the only slot
    let second = sampler.sample(Duration::from_secs(5)).await;
    assert!(second.degraded);

    // Once the stalled pass drains, sampling recovers
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(directory.enumerations.load(Ordering::SeqCst), 1);
    let third = sampler.sample(Duration::from_secs(5)).await;
    assert!(!third.degraded);
    assert_eq!(third.processes.len(), 1);
}

#[tokio::test]
async fn test_exited_processes_are_evicted_from_tracker() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(4321, "chrome.exe", "alice"),
        raw(5000, "notepad.exe", "alice"),
    ]));
    let sampler = BoundedSampler::new(directory.clone());

    sampler.sample(Duration::from_secs(5)).await;
    assert_eq!(sampler.tracker().tracked(), 2);

    directory.state.lock().processes.retain(|p| p.pid != 5000);
    tokio::time::sleep(Duration::from_millis(5)).await;
    sampler.sample(Duration::from_secs(5)).await;
    assert_eq!(sampler.tracker().tracked(), 1);
}

#[tokio::test]
async fn test_snapshot_groups_applications() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(100, "chrome.exe", "alice"),
        raw(101, "chrome.exe", "alice"),
        raw(200, "svchost.exe", "SYSTEM"),
    ]));
    let sampler = BoundedSampler::new(directory.clone());
    let snapshot = sampler.snapshot(Duration::from_secs(5)).await;

    assert!(!snapshot.degraded);
    assert_eq!(snapshot.processes.len(), 3);
    assert_eq!(snapshot.apps.len(), 1);
    assert_eq!(snapshot.apps[0].name, "chrome");
    assert_eq!(snapshot.apps[0].member_pids, vec![100, 101]);
    assert_eq!(snapshot.apps[0].exe.as_deref(), Some("/usr/bin/chrome.exe"));
    assert_eq!(snapshot.processes[0].exe.as_deref(), Some("/usr/bin/chrome.exe"));
    assert!(snapshot.timestamp > 0);
}
