// UI prompts and user interaction module

use colored::Colorize;
use std::io::{self, Write};

/// Ask user for yes/no confirmation
pub fn confirm(message: &str) -> io::Result<bool> {
    print!("{} ", message.white().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_affirmative(&input))
}

fn is_affirmative(input: &str) -> bool {
    let response = input.trim().to_lowercase();
    response == "y" || response == "yes"
}

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn warn(message: &str) {
    eprintln!("{}", message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}
