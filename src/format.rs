//! Human-readable rendering of raw counters.

const BYTE_UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];

/// Scale a byte count by powers of 1024, one fractional digit.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, BYTE_UNITS[unit])
}

/// Whole days, hours and minutes. Leftover seconds are dropped.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    format!("{}d {}h {}m", days, hours, mins)
}

pub fn format_percent(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Badge classes for a process status.
pub fn status_class(status: &str) -> &'static str {
    match status {
        "running" => "bg-green-100 text-green-800",
        "sleeping" => "bg-blue-100 text-blue-800",
        "stopped" => "bg-red-100 text-red-800",
        "zombie" => "bg-yellow-100 text-yellow-800",
        _ => "bg-gray-100 text-gray-800",
    }
}
