// Integration tests for the periodic poller

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use taskpro::core::process_monitor::{poll_task, BoundedSampler, Snapshot};

use super::support::{raw, MockDirectory};

#[tokio::test]
async fn test_poller_publishes_until_shutdown() {
    let directory = Arc::new(MockDirectory::new(vec![
        raw(100, "chrome.exe", "alice"),
        raw(200, "notepad.exe", "alice"),
    ]));
    let sampler = Arc::new(BoundedSampler::new(directory.clone()));

    let (snapshot_tx, mut snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let poller = tokio::spawn(poll_task(
        sampler,
        Duration::from_millis(20),
        snapshot_tx,
        shutdown_rx,
    ));

    tokio::time::timeout(Duration::from_secs(5), snapshot_rx.changed())
        .await
        .expect("no snapshot published")
        .unwrap();
    let snapshot = snapshot_rx.borrow_and_update().clone();
    assert!(!snapshot.degraded);
    assert_eq!(snapshot.processes.len(), 2);
    assert_eq!(snapshot.apps.len(), 2);

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), poller)
        .await
        .expect("poller did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_poller_stops_when_receivers_are_gone() {
    let directory = Arc::new(MockDirectory::new(vec![raw(100, "chrome.exe", "alice")]));
    let sampler = Arc::new(BoundedSampler::new(directory.clone()));

    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    drop(snapshot_rx);

    let poller = tokio::spawn(poll_task(
        sampler,
        Duration::from_millis(10),
        snapshot_tx,
        shutdown_rx,
    ));

    tokio::time::timeout(Duration::from_secs(5), poller)
        .await
        .expect("poller kept running without receivers")
        .unwrap();
}
