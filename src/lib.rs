// taskpro library - public API

// Re-export error types
pub mod error;
pub use error::{Result, TaskError};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;

// Initialize logging; RUST_LOG overrides the default level
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
