use anyhow::Result;
use clap::ArgMatches;
use std::cmp::Ordering;
use std::time::Duration;

use super::engine::{block_on, measured_snapshot, Engine};
use crate::core::process_monitor::ProcessRecord;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Cpu,
    Memory,
    Name,
    Pid,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "cpu" => Some(SortKey::Cpu),
            "memory" | "mem" => Some(SortKey::Memory),
            "name" => Some(SortKey::Name),
            "pid" => Some(SortKey::Pid),
            _ => None,
        }
    }
}

/// CPU and memory sort descending, name and pid ascending
pub fn sort_records(records: &mut [ProcessRecord], key: SortKey) {
    match key {
        SortKey::Cpu => records.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(Ordering::Equal)
                .then(a.pid.cmp(&b.pid))
        }),
        SortKey::Memory => {
            records.sort_by(|a, b| b.memory_bytes.cmp(&a.memory_bytes).then(a.pid.cmp(&b.pid)))
        }
        SortKey::Name => records.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.pid.cmp(&b.pid))
        }),
        SortKey::Pid => records.sort_by_key(|record| record.pid),
    }
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let sort_key = matches
        .get_one::<String>("sort")
        .and_then(|value| SortKey::parse(value))
        .unwrap_or(SortKey::Cpu);
    let limit = matches.get_one::<usize>("limit").copied();
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

    let mut records = snapshot.processes;
    sort_records(&mut records, sort_key);
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        ui::print_process_table(&records);
        ui::dimmed(&format!("\n{} processes", records.len()));
    }

    Ok(())
}
