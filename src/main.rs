use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use taskpro::commands;

fn pid_arg() -> Arg {
    Arg::new("pid")
        .help("Process ID")
        .required(true)
        .index(1)
        .value_parser(clap::value_parser!(u32))
}

fn timeout_arg() -> Arg {
    Arg::new("timeout")
        .long("timeout")
        .value_name("MS")
        .help("Sampling timeout in milliseconds (overrides config)")
        .value_parser(clap::value_parser!(u64))
}

fn interval_arg() -> Arg {
    Arg::new("interval")
        .long("interval")
        .value_name("MS")
        .help("Delay between the two passes used to measure CPU load")
        .value_parser(clap::value_parser!(u64))
        .default_value("500")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print JSON instead of a table")
        .action(ArgAction::SetTrue)
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .short('y')
        .long("yes")
        .help("Do not ask for confirmation")
        .action(ArgAction::SetTrue)
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .short('n')
        .long("limit")
        .value_name("N")
        .help("Show at most N rows")
        .value_parser(clap::value_parser!(usize))
}

fn build_cli() -> Command {
    Command::new("taskpro")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect processes and applications, and stop them safely")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("ps")
                .about("List processes with CPU and memory usage")
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .help("Sort column")
                        .value_parser(["cpu", "memory", "name", "pid"])
                        .default_value("cpu"),
                )
                .arg(limit_arg())
                .arg(timeout_arg())
                .arg(interval_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("apps")
                .about("List user applications grouped by executable name")
                .arg(timeout_arg())
                .arg(interval_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("info")
                .about("Show details of a single process")
                .arg(pid_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("kill")
                .about("Terminate a process (protected system processes are refused)")
                .arg(pid_arg())
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Kill immediately instead of asking the process to exit")
                        .action(ArgAction::SetTrue),
                )
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("close")
                .about("Close every process of an application")
                .arg(
                    Arg::new("name")
                        .help("Application name, e.g. chrome or chrome.exe")
                        .required(true)
                        .index(1),
                )
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("suspend")
                .about("Suspend a process")
                .arg(pid_arg()),
        )
        .subcommand(
            Command::new("resume")
                .about("Resume a suspended process")
                .arg(pid_arg()),
        )
        .subcommand(
            Command::new("stats")
                .about("Show system-wide CPU, memory and swap usage")
                .arg(interval_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("watch")
                .about("Refresh the process list periodically until Ctrl+C")
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_name("MS")
                        .help("Refresh interval in milliseconds (overrides config)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("apps")
                        .long("apps")
                        .help("Show applications instead of processes")
                        .action(ArgAction::SetTrue),
                )
                .arg(limit_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("bash, zsh, fish, powershell or elvish")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    taskpro::init_logging();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("ps", sub_matches)) => commands::ps(sub_matches)?,
        Some(("apps", sub_matches)) => commands::apps(sub_matches)?,
        Some(("info", sub_matches)) => commands::info(sub_matches)?,
        Some(("kill", sub_matches)) => commands::kill(sub_matches)?,
        Some(("close", sub_matches)) => commands::close(sub_matches)?,
        Some(("suspend", sub_matches)) => commands::suspend(sub_matches)?,
        Some(("resume", sub_matches)) => commands::resume(sub_matches)?,
        Some(("stats", sub_matches)) => commands::stats(sub_matches)?,
        Some(("watch", sub_matches)) => commands::watch(sub_matches)?,
        Some(("completions", sub_matches)) => {
            let mut cli = build_cli();
            commands::completions::execute(sub_matches, &mut cli)?;
        }
        Some(("version", _)) => commands::version()?,
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}
