//! Grouping of process records into applications.

use std::collections::HashMap;

use super::guard::is_hidden_from_apps;
use super::metrics::{ApplicationRecord, ProcessRecord, ProcessStatus};

/// Executable suffixes stripped from names before grouping
pub const EXECUTABLE_SUFFIXES: &[&str] = &[".exe", ".com"];

/// Strip a known executable suffix, keeping the original case of the rest
pub fn normalize_app_name(name: &str) -> &str {
    let name = name.trim();
    for suffix in EXECUTABLE_SUFFIXES {
        if name.len() > suffix.len() {
            let split = name.len() - suffix.len();
            if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(suffix) {
                return &name[..split];
            }
        }
    }
    name
}

/// Fold a batch of process records into application records.
///
/// Output follows the order in which each application was first seen, so a
/// fixed input order always yields the same output.
pub fn aggregate(records: &[ProcessRecord]) -> Vec<ApplicationRecord> {
    let mut apps: Vec<ApplicationRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        if is_hidden_from_apps(record.is_protected, &record.owner) {
            continue;
        }

        let display_name = normalize_app_name(&record.name);
        let key = display_name.to_lowercase();

        let slot = *index.entry(key).or_insert_with(|| {
            apps.push(ApplicationRecord {
                name: display_name.to_string(),
                member_pids: Vec::new(),
                cpu_percent: 0.0,
                memory_bytes: 0,
                memory_percent: 0.0,
                process_count: 0,
                status: ProcessStatus::Running,
                is_closeable: true,
                exe: None,
            });
            apps.len() - 1
        });

        let app = &mut apps[slot];
        app.member_pids.push(record.pid);
        app.process_count += 1;
        app.cpu_percent += record.cpu_percent;
        app.memory_bytes += record.memory_bytes;
        app.memory_percent += record.memory_percent;

        // First non-running status sticks
        if app.status.is_running() && !record.status.is_running() {
            app.status = record.status;
        }
        if record.is_protected {
            app.is_closeable = false;
        }
        if app.exe.is_none() {
            app.exe = record.exe.clone();
        }
    }

    apps
}

/// Find an application by name, ignoring case and executable suffix
pub fn find_app<'a>(apps: &'a [ApplicationRecord], name: &str) -> Option<&'a ApplicationRecord> {
    let wanted = normalize_app_name(name).to_lowercase();
    apps.iter().find(|app| app.name.to_lowercase() == wanted)
}
