use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::core::process_monitor::{LifecycleConfig, ProcessGuard, SamplerConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sampler: SamplerSettings,
    #[serde(default)]
    pub lifecycle: LifecycleSettings,
    #[serde(default)]
    pub protection: ProtectionSettings,
    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub timeout_ms: u64,
    pub max_outstanding_workers: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            max_outstanding_workers: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    pub terminate_wait_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            terminate_wait_ms: 3_000,
            poll_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionSettings {
    /// Names protected in addition to the built-in set
    pub extra_names: Vec<String>,
    pub reserved_pid_ceiling: u32,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            extra_names: Vec::new(),
            reserved_pid_ceiling: crate::core::process_monitor::guard::DEFAULT_RESERVED_PID_CEILING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub interval_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { interval_ms: 1_000 }
    }
}

impl Config {
    /// Load from the user config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from `path`. A missing, empty or unreadable-as-JSON file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config file {:?}: {}", path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("taskpro").join("config.json"))
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            timeout: Duration::from_millis(self.sampler.timeout_ms),
            max_outstanding_workers: self.sampler.max_outstanding_workers.max(1),
            ..SamplerConfig::default()
        }
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            terminate_wait: Duration::from_millis(self.lifecycle.terminate_wait_ms),
        }
    }

    pub fn exit_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lifecycle.poll_interval_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms.max(100))
    }

    /// Build the protection policy. It is immutable once built.
    pub fn build_guard(&self) -> Arc<ProcessGuard> {
        Arc::new(
            ProcessGuard::with_extra_names(&self.protection.extra_names)
                .reserved_pid_ceiling(self.protection.reserved_pid_ceiling),
        )
    }
}
