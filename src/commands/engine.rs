//! Wiring shared by the command handlers: configuration, the OS-backed
//! directory, and the components built on top of it.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::Config;
use crate::core::process_monitor::{
    BoundedSampler, LifecycleController, ProcessDirectory, ProcessGuard, Snapshot,
};
use crate::platform::SysinfoDirectory;

pub struct Engine {
    pub config: Config,
    directory: Arc<dyn ProcessDirectory>,
    guard: Arc<ProcessGuard>,
}

impl Engine {
    pub fn load() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        let directory =
            SysinfoDirectory::new().with_exit_poll_interval(config.exit_poll_interval());
        let guard = config.build_guard();

        Self {
            config,
            directory: Arc::new(directory),
            guard,
        }
    }

    /// Sampler honouring an optional `--timeout` override in milliseconds
    pub fn sampler(&self, timeout_ms: Option<u64>) -> BoundedSampler {
        let mut sampler_config = self.config.sampler_config();
        if let Some(ms) = timeout_ms {
            sampler_config.timeout = Duration::from_millis(ms);
        }

        BoundedSampler::with_config(
            Arc::clone(&self.directory),
            Arc::clone(&self.guard),
            sampler_config,
        )
    }

    pub fn controller(&self) -> LifecycleController {
        LifecycleController::with_config(
            Arc::clone(&self.directory),
            Arc::clone(&self.guard),
            self.config.lifecycle_config(),
        )
    }
}

/// Run a future to completion on a small runtime owned by the caller.
///
/// Blocking workers abandoned by a timed-out pass are left to finish on their
/// own; the caller returns as soon as `future` does.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;

    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

/// Two passes `interval` apart, so the returned snapshot carries measured CPU load
pub async fn measured_snapshot(sampler: &BoundedSampler, interval: Duration) -> Snapshot {
    let timeout = sampler.config().timeout;
    let warmup = sampler.sample(timeout).await;
    if warmup.degraded {
        log::debug!("Warm-up pass degraded; CPU figures may read 0.0");
    }

    tokio::time::sleep(interval).await;
    sampler.snapshot(timeout).await
}
