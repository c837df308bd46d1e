// UI and formatting module

pub mod formatters;
pub mod process_table;
pub mod prompts;
pub mod system_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{fit_width, format_percent, format_size, format_start_time};
pub use process_table::{print_app_table, print_process_details, print_process_table};
pub use prompts::{confirm, dimmed, error, success, warn};
pub use system_formatters::format_system_stats;
