//! Process sampling and aggregation engine.
//!
//! This module turns raw OS process attributes into CPU-annotated records,
//! groups them into applications, and exposes guarded lifecycle control.

pub mod apps;
pub mod cpu_tracker;
mod directory;
pub mod guard;
pub mod lifecycle;
mod metrics;
mod runtime;
mod sampler;

pub use apps::{aggregate, find_app, normalize_app_name};
pub use cpu_tracker::{CpuLoadTracker, ProcessIdentity, TrackerPass};
pub use directory::{
    Attr, LiveProcess, ProbeError, ProcessDirectory, ProcessHandle, ProcessIter, RawProcess,
    SignalKind,
};
pub use guard::{is_hidden_from_apps, is_protected, is_system_account, ProcessGuard};
pub use lifecycle::{
    Ack, CloseFailure, CloseReport, LifecycleAction, LifecycleConfig, LifecycleController, Outcome,
};
pub use metrics::{
    ApplicationRecord, ProcessDetails, ProcessRecord, ProcessStatus, SampleResult, Snapshot,
    UNKNOWN_OWNER,
};
pub use runtime::{poll_task, SamplingRuntime};
pub use sampler::{BoundedSampler, SamplerConfig};
