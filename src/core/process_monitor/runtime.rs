//! Tokio runtime that polls the sampler on an interval.
//!
//! Snapshots are published on a watch channel so readers always see the most
//! recent one. A degraded pass is published like any other: readers decide how
//! to present it.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::metrics::Snapshot;
use super::sampler::BoundedSampler;

/// Wrapper around the Tokio runtime driving periodic sampling.
pub struct SamplingRuntime {
    /// Receiver for the latest snapshot
    pub snapshot_rx: watch::Receiver<Arc<Snapshot>>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    /// Runtime driving the poller
    runtime: tokio::runtime::Runtime,
}

impl SamplingRuntime {
    /// Create the runtime and start polling every `period`.
    pub fn new(sampler: Arc<BoundedSampler>, period: Duration) -> anyhow::Result<Self> {
        log::info!("Starting sampling runtime (interval: {:?})", period);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("sampling-worker")
            .build()?;

        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        runtime.spawn(poll_task(
            sampler,
            period,
            snapshot_tx,
            shutdown_tx.subscribe(),
        ));

        Ok(Self {
            snapshot_rx,
            shutdown_tx,
            runtime,
        })
    }

    /// Block until the next snapshot is published.
    ///
    /// Returns `None` once the poller has stopped.
    pub fn next_snapshot(&mut self) -> Option<Arc<Snapshot>> {
        let rx = &mut self.snapshot_rx;
        self.runtime.block_on(async {
            rx.changed().await.ok()?;
            let snapshot = rx.borrow_and_update().clone();
            Some(snapshot)
        })
    }

    /// Stop the poller and release the runtime without waiting for
    /// enumeration workers that are still running.
    pub fn shutdown(self) {
        log::info!("Shutting down sampling runtime");
        let _ = self.shutdown_tx.send(());
        self.runtime.shutdown_background();
    }
}

/// Poll the sampler on a fixed interval until shutdown or until every
/// snapshot receiver is gone.
pub async fn poll_task(
    sampler: Arc<BoundedSampler>,
    period: Duration,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = sampler.snapshot(sampler.config().timeout).await;
                if snapshot.degraded {
                    log::warn!("Publishing degraded snapshot");
                }

                if snapshot_tx.send(Arc::new(snapshot)).is_err() {
                    log::debug!("No snapshot receivers left; stopping poller");
                    break;
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Poller shutting down");
                break;
            }
        }
    }
}
