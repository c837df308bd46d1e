// Core functionality module

pub mod config;
pub mod process_monitor;
pub mod system_stats;
