use anyhow::{Context, Result};
use clap::ArgMatches;
use std::time::Duration;

use crate::core::system_stats;
use crate::ui::format_system_stats;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let interval_ms = matches.get_one::<u64>("interval").copied().unwrap_or(500);
    let interval = Duration::from_millis(interval_ms);
    let json = matches.get_flag("json");

    let stats = system_stats::collect(interval).context("Failed to collect system stats")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        format_system_stats(&stats);
    }

    Ok(())
}
