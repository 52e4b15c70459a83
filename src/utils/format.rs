//! Human-readable formatting of sizes and durations.

const STATS_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
const TREE_UNITS: &[&str] = &["B", "KB", "MB"];

/// Formats a byte count for the statistics panel, e.g. `0 Bytes`, `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let (value, unit) = scale(bytes, STATS_UNITS);
    format!("{} {}", trim_decimals(&format!("{value:.2}")), unit)
}

/// Formats a byte count for tree annotations, e.g. `0B`, `512B`, `1.5KB`.
pub fn format_bytes_compact(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let (value, unit) = scale(bytes, TREE_UNITS);
    format!("{}{}", trim_decimals(&format!("{value:.1}")), unit)
}

/// Formats a duration given in seconds: milliseconds below one second.
pub fn format_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{}ms", (seconds * 1000.0).round() as u64)
    } else {
        format!("{seconds:.2}s")
    }
}

fn scale(bytes: u64, units: &[&'static str]) -> (f64, &'static str) {
    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= 1024.0 && idx + 1 < units.len() {
        value /= 1024.0;
        idx += 1;
    }
    (value, units[idx])
}

fn trim_decimals(formatted: &str) -> &str {
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted
    }
}
