// Integration tests for guarded lifecycle control

use std::sync::Arc;
use std::time::Duration;

use taskpro::core::process_monitor::{
    aggregate, find_app, BoundedSampler, LifecycleAction, LifecycleConfig, LifecycleController,
    Outcome, ProcessGuard, ProcessStatus,
};
use taskpro::TaskError;

use super::support::{raw, MockDirectory};

fn controller(directory: &Arc<MockDirectory>) -> LifecycleController {
    LifecycleController::with_config(
        directory.clone(),
        Arc::new(ProcessGuard::new()),
        LifecycleConfig {
            terminate_wait: Duration::from_millis(50),
        },
    )
}

#[test]
fn test_terminate_protected_is_forbidden_without_signal() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(4000, "explorer.exe", "alice"),
        raw(5, "myapp.exe", "alice"),
    ]));
    let controller = controller(&directory);

    let err = controller.terminate(4000, false).unwrap_err();
    assert!(matches!(err, TaskError::Forbidden { pid: 4000, .. }));

    let err = controller.terminate(5, true).unwrap_err();
    assert!(matches!(err, TaskError::Forbidden { pid: 5, .. }));

    assert!(controller.suspend(4000).is_err());
    assert_eq!(directory.signal_count(), 0);
}

#[test]
fn test_terminate_confirms_exit() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "alice")]));
    let ack = controller(&directory).terminate(4321, false).unwrap();

    assert_eq!(ack.pid, 4321);
    assert_eq!(ack.name, "notepad.exe");
    assert_eq!(ack.action, LifecycleAction::Terminate);
    assert_eq!(ack.outcome, Outcome::Confirmed);
    assert!(ack.message.contains("terminated successfully"));
    assert_eq!(directory.signal_count(), 1);
}

#[test]
fn test_force_terminate_uses_kill() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "alice")]));
    directory.state.lock().stubborn.insert(4321);

    // Stubborn processes ignore terminate but cannot ignore kill
    let ack = controller(&directory).terminate(4321, true).unwrap();
    assert_eq!(ack.action, LifecycleAction::Kill);
    assert_eq!(ack.outcome, Outcome::Confirmed);
}

#[test]
fn test_terminate_wait_expiry_is_soft_success() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "alice")]));
    directory.state.lock().stubborn.insert(4321);

    let ack = controller(&directory).terminate(4321, false).unwrap();
    assert_eq!(ack.outcome, Outcome::Pending);
    assert!(ack.message.contains("may take time"));
}

#[test]
fn test_missing_process_is_not_found() {
    let directory = Arc::new(MockDirectory::new(vec![]));
    let controller = controller(&directory);

    assert!(matches!(
        controller.terminate(99999, false),
        Err(TaskError::NotFound { pid: 99999 })
    ));
    assert!(matches!(
        controller.inspect(99999),
        Err(TaskError::NotFound { .. })
    ));
}

#[test]
fn test_recycled_pid_is_not_signalled() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "alice")]));
    directory.state.lock().recycle.insert(4321);

    let err = controller(&directory).terminate(4321, false).unwrap_err();
    assert!(matches!(err, TaskError::NotFound { pid: 4321 }));
    assert_eq!(directory.signal_count(), 0);
}

#[test]
fn test_process_renamed_to_protected_is_not_signalled() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "setup.exe", "alice")]));
    directory
        .state
        .lock()
        .rename
        .insert(4321, "lsass.exe".to_string());

    let err = controller(&directory).terminate(4321, true).unwrap_err();
    match err {
        TaskError::Forbidden { pid, name, .. } => {
            assert_eq!(pid, 4321);
            assert_eq!(name, "lsass.exe");
        }
        other => panic!("expected Forbidden, got {:?}", other),
    }
    assert_eq!(directory.signal_count(), 0);
    assert!(directory.status_of(4321).is_some());
}

#[test]
fn test_os_refusal_is_access_denied() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "bob")]));
    directory.state.lock().deny.insert(4321);

    let err = controller(&directory).suspend(4321).unwrap_err();
    assert!(err.is_privilege_gap());
    assert!(matches!(err, TaskError::AccessDenied { pid: 4321, .. }));
}

#[test]
fn test_suspend_then_resume() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "alice")]));
    let controller = controller(&directory);

    controller.suspend(4321).unwrap();
    assert_eq!(directory.status_of(4321), Some(ProcessStatus::Stopped));

    let ack = controller.resume(4321).unwrap();
    assert_eq!(ack.action, LifecycleAction::Resume);
    assert_eq!(directory.status_of(4321), Some(ProcessStatus::Running));
}

#[test]
fn test_resume_running_process_twice() {
    let directory = Arc::new(MockDirectory::new(vec![raw(4321, "notepad.exe", "alice")]));
    let controller = controller(&directory);

    assert!(controller.resume(4321).is_ok());
    assert!(controller.resume(4321).is_ok());
    assert_eq!(directory.status_of(4321), Some(ProcessStatus::Running));
}

#[test]
fn test_inspect_marks_protected() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(4000, "explorer.exe", "alice"),
        raw(4321, "notepad.exe", "alice"),
    ]));
    let controller = controller(&directory);

    assert!(controller.inspect(4000).unwrap().is_protected);
    let details = controller.inspect(4321).unwrap();
    assert!(!details.is_protected);
    assert_eq!(details.name, "notepad.exe");
}

#[tokio::test]
async fn test_close_application_terminates_every_member() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(100, "chrome.exe", "alice"),
        raw(101, "chrome.exe", "alice"),
        raw(200, "notepad.exe", "alice"),
    ]));
    directory.state.lock().stubborn.insert(101);

    let sampler = BoundedSampler::new(directory.clone());
    let sample = sampler.sample(Duration::from_secs(5)).await;
    let apps = aggregate(&sample.processes);
    let chrome = find_app(&apps, "Chrome.exe").unwrap();

    let report = controller(&directory).close_application(chrome).unwrap();
    assert_eq!(report.name, "chrome");
    assert!(report.failures.is_empty());

    let outcomes: Vec<(u32, Outcome)> = report
        .terminated
        .iter()
        .map(|ack| (ack.pid, ack.outcome))
        .collect();
    assert_eq!(outcomes, vec![(100, Outcome::Confirmed), (101, Outcome::Pending)]);
    assert_eq!(directory.status_of(200), Some(ProcessStatus::Running));
}

#[tokio::test]
async fn test_close_application_with_protected_member_is_forbidden() {
    // A protected process owned by a regular user still shows up in its app
    let directory = Arc::new(MockDirectory::new(vec![
        raw(4000, "explorer.exe", "alice"),
        raw(4001, "explorer.exe", "alice"),
    ]));

    let sampler = BoundedSampler::new(directory.clone());
    let sample = sampler.sample(Duration::from_secs(5)).await;
    let apps = aggregate(&sample.processes);
    let explorer = find_app(&apps, "explorer").unwrap();
    assert!(!explorer.is_closeable);

    let err = controller(&directory).close_application(explorer).unwrap_err();
    assert!(matches!(err, TaskError::Forbidden { .. }));
    assert_eq!(directory.signal_count(), 0);
}

#[test]
fn test_close_application_reports_vanished_members() {
    let directory = Arc::new(MockDirectory::new(vec![raw(100, "chrome.exe", "alice")]));
    let records = vec![
        taskpro::core::process_monitor::ProcessRecord {
            pid: 100,
            name: "chrome.exe".to_string(),
            owner: "alice".to_string(),
            ..Default::default()
        },
        taskpro::core::process_monitor::ProcessRecord {
            pid: 102,
            name: "chrome.exe".to_string(),
            owner: "alice".to_string(),
            ..Default::default()
        },
    ];
    let apps = aggregate(&records);

    let report = controller(&directory).close_application(&apps[0]).unwrap();
    assert_eq!(report.terminated.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].pid, 102);
}
