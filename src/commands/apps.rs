use anyhow::Result;
use clap::ArgMatches;
use std::cmp::Ordering;
use std::time::Duration;

use super::engine::{block_on, measured_snapshot, Engine};
use crate::core::process_monitor::ApplicationRecord;
use crate::ui;

/// Busiest applications first; ties keep aggregation order
pub fn sort_apps(apps: &mut [ApplicationRecord]) {
    apps.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
            .then(b.memory_bytes.cmp(&a.memory_bytes))
    });
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let timeout_ms = matches.get_one::<u64>("timeout").copied();
    let interval_ms = matches.get_one::<u64>("interval").copied().unwrap_or(500);
    let interval = Duration::from_millis(interval_ms);
    let json = matches.get_flag("json");

    let engine = Engine::load()?;
    let sampler = engine.sampler(timeout_ms);
    let snapshot = block_on(measured_snapshot(&sampler, interval))?;

    if snapshot.degraded {
        ui::warn("Process sampling timed out; the listing is empty or incomplete.");
    }

    let mut apps = snapshot.apps;
    sort_apps(&mut apps);

    if json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
    } else {
        ui::print_app_table(&apps);
        ui::dimmed(&format!("\n{} applications", apps.len()));
    }

    Ok(())
}
