use anyhow::Result;
use clap::ArgMatches;

use super::engine::Engine;
use super::lifecycle::report_failure;
use crate::ui;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let Some(&pid) = matches.get_one::<u32>("pid") else {
        anyhow::bail!("a PID is required");
    };
    let json = matches.get_flag("json");

    let engine = Engine::load()?;
    let details = match engine.controller().inspect(pid) {
        Ok(details) => details,
        Err(e) => return Err(report_failure(e)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        ui::print_process_details(&details);
    }

    Ok(())
}
