// Platform-specific code module

pub mod elevation;
pub mod process_directory;
#[cfg(windows)]
pub mod thread_control;

// Re-exports for clean imports
pub use elevation::{is_elevated, privilege_hint};
pub use process_directory::{SysinfoDirectory, SysinfoHandle};
