// Command handlers module
pub mod apps;
pub mod completions;
pub mod engine;
pub mod info;
pub mod lifecycle;
pub mod ps;
pub mod stats;
pub mod version;
pub mod watch;

// Re-exports for cleaner imports
pub use apps::execute as apps;
pub use info::execute as info;
pub use lifecycle::{
    execute_close as close, execute_kill as kill, execute_resume as resume,
    execute_suspend as suspend,
};
pub use ps::execute as ps;
pub use stats::execute as stats;
pub use version::execute as version;
pub use watch::execute as watch;
