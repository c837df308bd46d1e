use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::apps::sort_apps;
use super::engine::Engine;
use super::ps::{sort_records, SortKey};
use crate::core::process_monitor::{SamplingRuntime, Snapshot};
use crate::ui;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let show_apps = matches.get_flag("apps");
    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(25);

    let engine = Engine::load()?;
    let interval = matches
        .get_one::<u64>("interval")
        .map(|ms| Duration::from_millis((*ms).max(100)))
        .unwrap_or_else(|| engine.config.watch_interval());

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_flag_clone = Arc::clone(&cancel_flag);
    ctrlc::set_handler(move || {
        cancel_flag_clone.store(true, Ordering::Relaxed);
    })
    .context("Failed to install Ctrl+C handler")?;

    let sampler = Arc::new(engine.sampler(None));
    let mut runtime = SamplingRuntime::new(sampler, interval)?;

    while !cancel_flag.load(Ordering::Relaxed) {
        let Some(snapshot) = runtime.next_snapshot() else {
            break;
        };
        if cancel_flag.load(Ordering::Relaxed) {
            break;
        }
        render(&snapshot, show_apps, limit)?;
    }

    runtime.shutdown();
    println!("\n{}", "Stopped watching.".dimmed());
    Ok(())
}

fn render(snapshot: &Snapshot, show_apps: bool, limit: usize) -> Result<()> {
    // Clear screen and move the cursor home
    print!("\x1B[2J\x1B[H");

    let taken_at = chrono::DateTime::from_timestamp(snapshot.timestamp, 0)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();
    println!(
        "{}  {}  {}",
        "taskpro watch".bold().bright_cyan(),
        taken_at.dimmed(),
        "(Ctrl+C to exit)".dimmed()
    );
    if snapshot.degraded {
        println!("{}", "Sampling timed out; showing an empty pass".yellow());
    }
    println!();

    if show_apps {
        let mut apps = snapshot.apps.clone();
        sort_apps(&mut apps);
        apps.truncate(limit);
        ui::print_app_table(&apps);
    } else {
        let mut records = snapshot.processes.clone();
        sort_records(&mut records, SortKey::Cpu);
        records.truncate(limit);
        ui::print_process_table(&records);
    }

    io::stdout().flush()?;
    Ok(())
}
