use colored::*;

use super::formatters::{fit_width, format_percent, format_size, format_start_time};
use crate::core::process_monitor::{
    ApplicationRecord, ProcessDetails, ProcessRecord, ProcessStatus,
};

const NAME_WIDTH: usize = 28;
const OWNER_WIDTH: usize = 16;

/// Colour a CPU percentage by load
fn cpu_cell(cpu_percent: f64) -> ColoredString {
    let text = format!("{:>7}", format_percent(cpu_percent));
    if cpu_percent >= 50.0 {
        text.red().bold()
    } else if cpu_percent >= 10.0 {
        text.yellow()
    } else {
        text.normal()
    }
}

fn status_cell(status: ProcessStatus) -> ColoredString {
    let text = format!("{:<9}", status.as_str());
    match status {
        ProcessStatus::Running | ProcessStatus::Sleeping | ProcessStatus::Idle => text.green(),
        ProcessStatus::Stopped => text.yellow(),
        ProcessStatus::Zombie | ProcessStatus::Dead => text.red(),
        ProcessStatus::Unknown => text.dimmed(),
    }
}

pub fn print_process_table(records: &[ProcessRecord]) {
    println!(
        "{}",
        format!(
            "{:>7}  {}  {}  {:>7}  {:>11}  {:>6}  {:>4}  {:<9}",
            "PID",
            fit_width("NAME", NAME_WIDTH),
            fit_width("USER", OWNER_WIDTH),
            "CPU",
            "MEM",
            "MEM%",
            "THR",
            "STATUS"
        )
        .bold()
    );

    for record in records {
        let name = fit_width(&record.name, NAME_WIDTH);
        let name = if record.is_protected {
            name.dimmed()
        } else {
            name.normal()
        };

        println!(
            "{:>7}  {}  {}  {}  {:>11}  {:>6}  {:>4}  {}",
            record.pid,
            name,
            fit_width(&record.owner, OWNER_WIDTH),
            cpu_cell(record.cpu_percent),
            format_size(record.memory_bytes),
            format_percent(record.memory_percent),
            record.thread_count,
            status_cell(record.status)
        );
    }
}

pub fn print_app_table(apps: &[ApplicationRecord]) {
    println!(
        "{}",
        format!(
            "{}  {:>5}  {:>7}  {:>11}  {:>6}  {:<9}  {}",
            fit_width("APPLICATION", NAME_WIDTH),
            "PROCS",
            "CPU",
            "MEM",
            "MEM%",
            "STATUS",
            "CLOSE"
        )
        .bold()
    );

    for app in apps {
        let closeable = if app.is_closeable {
            "yes".green()
        } else {
            "no".red()
        };

        println!(
            "{}  {:>5}  {}  {:>11}  {:>6}  {}  {}",
            fit_width(&app.name, NAME_WIDTH),
            app.process_count,
            cpu_cell(app.cpu_percent),
            format_size(app.memory_bytes),
            format_percent(app.memory_percent),
            status_cell(app.status),
            closeable
        );
    }
}

pub fn print_process_details(details: &ProcessDetails) {
    let field = |label: &str, value: String| {
        println!("  {:<16} {}", format!("{}:", label).bold(), value);
    };

    println!("\n{}", format!("PROCESS {}", details.pid).bold().bright_cyan());
    println!("{}", "=".repeat(60));

    field("Name", details.name.clone());
    field(
        "Parent PID",
        details
            .parent_pid
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    field("User", details.owner.clone());
    field("Status", details.status.to_string());
    field("Started", format_start_time(details.start_time));
    field("Threads", details.thread_count.to_string());
    field("Memory", format_size(details.memory_bytes));
    field("Virtual memory", format_size(details.virtual_memory_bytes));
    field("Executable", details.exe.clone().unwrap_or_else(|| "-".to_string()));
    field("Working dir", details.cwd.clone().unwrap_or_else(|| "-".to_string()));

    let cmdline = if details.cmdline.is_empty() {
        "-".to_string()
    } else {
        details.cmdline.join(" ")
    };
    field("Command line", cmdline);

    if details.is_protected {
        println!("\n  {}", "Protected system process: lifecycle actions are refused".yellow());
    }
    println!();
}
