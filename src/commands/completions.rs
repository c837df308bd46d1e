use anyhow::Result;
use clap::{ArgMatches, Command};
use clap_complete::{generate, Shell};
use std::io;

fn parse_shell(name: &str) -> Option<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "powershell" => Some(Shell::PowerShell),
        "elvish" => Some(Shell::Elvish),
        _ => None,
    }
}

/// Generate shell completions for the specified shell
pub fn execute(matches: &ArgMatches, cli: &mut Command) -> Result<()> {
    let Some(shell_str) = matches.get_one::<String>("shell") else {
        anyhow::bail!("shell argument is required (bash, zsh, fish, powershell, elvish)");
    };

    let Some(shell) = parse_shell(shell_str) else {
        anyhow::bail!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish, powershell, elvish",
            shell_str
        );
    };

    generate(shell, cli, "taskpro", &mut io::stdout());
    Ok(())
}
