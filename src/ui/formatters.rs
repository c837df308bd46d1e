use chrono::{DateTime, Local, TimeZone};
use humansize::{format_size as human_format_size, BINARY};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a byte count in human-readable form (KiB, MiB, GiB)
pub fn format_size(bytes: u64) -> String {
    human_format_size(bytes, BINARY)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format seconds since the Unix epoch as local time (YYYY-MM-DD HH:MM:SS)
pub fn format_start_time(epoch_secs: u64) -> String {
    let Ok(secs) = i64::try_from(epoch_secs) else {
        return "-".to_string();
    };

    match Local.timestamp_opt(secs, 0).single() {
        Some(datetime) if secs > 0 => format_datetime(datetime),
        _ => "-".to_string(),
    }
}

fn format_datetime(datetime: DateTime<Local>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Fit `text` into `width` display columns, padding or truncating with "..."
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        let pad = width - text.width();
        return format!("{}{}", text, " ".repeat(pad));
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let cw = ch.width().unwrap_or(0);
        // keep room for "..."
        if used + cw > width.saturating_sub(3) {
            break;
        }
        out.push(ch);
        used += cw;
    }
    out.push_str(&".".repeat(width.min(3)));

    let pad = width.saturating_sub(out.width());
    format!("{}{}", out, " ".repeat(pad))
}
