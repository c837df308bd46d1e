use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::engine::{block_on, Engine};
use crate::core::process_monitor::{find_app, Ack, Outcome};
use crate::error::TaskError;
use crate::platform::privilege_hint;
use crate::ui;

/// Print a lifecycle failure, with a privilege hint when the OS refused
pub fn report_failure(err: TaskError) -> anyhow::Error {
    if err.is_privilege_gap() {
        if let Some(hint) = privilege_hint() {
            ui::warn(hint);
        }
    }
    anyhow::Error::new(err)
}

fn print_ack(ack: &Ack) {
    match ack.outcome {
        Outcome::Confirmed => ui::success(&ack.message),
        Outcome::Pending => ui::warn(&ack.message),
    }
}

fn get_pid(matches: &ArgMatches) -> Result<u32> {
    matches
        .get_one::<u32>("pid")
        .copied()
        .context("a PID is required")
}

/// Ask before a destructive action unless `--yes` was given
fn confirmed(matches: &ArgMatches, question: &str) -> Result<bool> {
    if matches.get_flag("yes") {
        return Ok(true);
    }

    let answer = ui::confirm(&format!("{} [y/N]", question))?;
    if !answer {
        ui::dimmed("Cancelled.");
    }
    Ok(answer)
}

pub fn execute_kill(matches: &ArgMatches) -> Result<()> {
    let pid = get_pid(matches)?;
    let force = matches.get_flag("force");

    let engine = Engine::load()?;
    let controller = engine.controller();

    let label = match controller.inspect(pid) {
        Ok(details) => format!("{} (PID: {})", details.name, pid),
        Err(TaskError::NotFound { .. }) => return Err(report_failure(TaskError::not_found(pid))),
        Err(_) => format!("PID {}", pid),
    };

    let verb = if force { "Force kill" } else { "Terminate" };
    if !confirmed(matches, &format!("{} {}?", verb, label))? {
        return Ok(());
    }

    let ack = controller.terminate(pid, force).map_err(report_failure)?;
    print_ack(&ack);
    Ok(())
}

pub fn execute_close(matches: &ArgMatches) -> Result<()> {
    let Some(name) = matches.get_one::<String>("name") else {
        anyhow::bail!("an application name is required");
    };

    let engine = Engine::load()?;
    let sampler = engine.sampler(None);
    let snapshot = block_on(sampler.snapshot(sampler.config().timeout))?;
    if snapshot.degraded {
        anyhow::bail!("Process sampling timed out; cannot resolve application '{}'", name);
    }

    let Some(app) = find_app(&snapshot.apps, name) else {
        anyhow::bail!("Application '{}' not found", name);
    };

    if !app.is_closeable {
        return Err(report_failure(TaskError::forbidden(
            app.member_pids.first().copied().unwrap_or_default(),
            app.name.as_str(),
            "close",
        )));
    }

    let question = format!(
        "Close {} ({} process{})?",
        app.name.bold(),
        app.process_count,
        if app.process_count == 1 { "" } else { "es" }
    );
    if !confirmed(matches, &question)? {
        return Ok(());
    }

    let report = engine
        .controller()
        .close_application(app)
        .map_err(report_failure)?;

    for ack in &report.terminated {
        print_ack(ack);
    }
    for failure in &report.failures {
        ui::error(&format!("PID {}: {}", failure.pid, failure.reason));
    }

    let summary = format!(
        "Closed {}: {} terminated, {} failed",
        report.name,
        report.terminated.len(),
        report.failures.len()
    );
    if report.failures.is_empty() {
        ui::success(&summary);
    } else {
        ui::warn(&summary);
    }

    Ok(())
}

pub fn execute_suspend(matches: &ArgMatches) -> Result<()> {
    let pid = get_pid(matches)?;
    let engine = Engine::load()?;
    let ack = engine.controller().suspend(pid).map_err(report_failure)?;
    print_ack(&ack);
    Ok(())
}

pub fn execute_resume(matches: &ArgMatches) -> Result<()> {
    let pid = get_pid(matches)?;
    let engine = Engine::load()?;
    let ack = engine.controller().resume(pid).map_err(report_failure)?;
    print_ack(&ack);
    Ok(())
}
