use colored::*;

use super::formatters::format_size;
use crate::core::system_stats::{CpuStats, MemoryStats, SwapStats, SystemStats};

fn usage_colored(usage: f32) -> ColoredString {
    let text = format!("{:.1}%", usage);
    if usage > 80.0 {
        text.red()
    } else if usage > 50.0 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Format seconds as "3d 4h 12m"
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

pub fn format_system_stats(stats: &SystemStats) {
    println!("\n{}", "SYSTEM STATS".bold().bright_cyan());
    println!("{}", "=".repeat(60));

    print_cpu_stats(&stats.cpu);
    print_memory_stats(&stats.memory);
    print_swap_stats(&stats.swap);

    println!("\n  Uptime: {}", format_uptime(stats.uptime_secs));
    println!();
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

fn print_cpu_stats(cpu: &CpuStats) {
    print_section_header("CPU");

    match cpu.physical_cores {
        Some(physical) => println!(
            "  Cores: {} physical, {} logical",
            physical, cpu.logical_cores
        ),
        None => println!("  Cores: {} logical", cpu.logical_cores),
    }
    println!("  Usage: {}", usage_colored(cpu.usage_percent));

    for (chunk_index, chunk) in cpu.per_core_percent.chunks(4).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(i, usage)| {
                format!("#{:<2} {:>7}", chunk_index * 4 + i, usage_colored(*usage))
            })
            .collect();
        println!("    {}", cells.join("   "));
    }
}

fn print_memory_stats(memory: &MemoryStats) {
    print_section_header("Memory");

    println!(
        "  Used: {} / {} ({})",
        format_size(memory.used_bytes),
        format_size(memory.total_bytes),
        usage_colored(memory.usage_percent)
    );
    println!("  Available: {}", format_size(memory.available_bytes));
}

fn print_swap_stats(swap: &SwapStats) {
    print_section_header("Swap");

    if swap.total_bytes == 0 {
        println!("  {}", "No swap configured".dimmed());
        return;
    }
    println!(
        "  Used: {} / {} ({})",
        format_size(swap.used_bytes),
        format_size(swap.total_bytes),
        usage_colored(swap.usage_percent)
    );
}
