use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::error::Result;

/// System-wide CPU, memory and swap figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub swap: SwapStats,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    pub usage_percent: f32,
    pub per_core_percent: Vec<f32>,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub usage_percent: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub usage_percent: f32,
}

pub fn usage_percent(used: u64, total: u64) -> f32 {
    if total > 0 {
        (used as f32 / total as f32) * 100.0
    } else {
        0.0
    }
}

impl MemoryStats {
    pub fn new(total_bytes: u64, used_bytes: u64, available_bytes: u64) -> Self {
        Self {
            total_bytes,
            used_bytes,
            available_bytes,
            usage_percent: usage_percent(used_bytes, total_bytes),
        }
    }
}

impl SwapStats {
    pub fn new(total_bytes: u64, used_bytes: u64) -> Self {
        Self {
            total_bytes,
            used_bytes,
            usage_percent: usage_percent(used_bytes, total_bytes),
        }
    }
}

/// Collect a summary. CPU usage is measured across `sample_interval`, which
/// is raised to sysinfo's minimum update interval when shorter.
pub fn collect(sample_interval: Duration) -> Result<SystemStats> {
    let refresh = RefreshKind::nothing()
        .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
        .with_memory(MemoryRefreshKind::everything());
    let mut sys = System::new_with_specifics(refresh);

    // Usage needs two refreshes some time apart
    thread::sleep(sample_interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
    sys.refresh_cpu_usage();

    let per_core_percent: Vec<f32> = sys.cpus().iter().map(|cpu| cpu.cpu_usage()).collect();

    Ok(SystemStats {
        cpu: CpuStats {
            usage_percent: sys.global_cpu_usage(),
            logical_cores: per_core_percent.len().max(1),
            per_core_percent,
            physical_cores: System::physical_core_count(),
        },
        memory: MemoryStats::new(
            sys.total_memory(),
            sys.used_memory(),
            sys.available_memory(),
        ),
        swap: SwapStats::new(sys.total_swap(), sys.used_swap()),
        uptime_secs: System::uptime(),
    })
}
