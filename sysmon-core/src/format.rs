//! Human-readable metric formatting.

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Formats a byte count with a 1024-based unit, e.g. `"1.5 MB"`.
#[must_use]
pub fn bytes(value: f64) -> String {
    let value = value.max(0.0);
    if value < KB {
        format!("{value:.1} B")
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.1} GB", value / GB)
    }
}

/// Formats a throughput in bytes per second, e.g. `"2.0 MB/s"`.
#[must_use]
pub fn rate(bytes_per_sec: f64) -> String {
    format!("{}/s", bytes(bytes_per_sec))
}

/// Formats a byte count in gigabytes, e.g. `"7.8 GB"`.
#[must_use]
pub fn gigabytes(value: u64) -> String {
    format!("{:.1} GB", value as f64 / GB)
}

/// Formats an optional percentage, `"N/A"` when unavailable.
#[must_use]
pub fn percent(value: Option<f32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| format!("{value:.1}%"))
}

/// Formats an optional temperature in degrees Celsius.
#[must_use]
pub fn celsius(value: Option<f32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| format!("{value:.1}°C"))
}

/// Converts bytes per second into kilobytes per second for charting.
#[must_use]
pub fn to_kb(bytes: f32) -> f32 {
    bytes / KB as f32
}

/// Converts bytes per second into megabytes per second for charting.
#[must_use]
pub fn to_mb(bytes: f32) -> f32 {
    bytes / MB as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_units() {
        assert_eq!(rate(0.0), "0.0 B/s");
        assert_eq!(rate(512.0), "512.0 B/s");
        assert_eq!(rate(1023.9), "1023.9 B/s");
        assert_eq!(rate(1024.0), "1.0 KB/s");
        assert_eq!(rate(1536.0), "1.5 KB/s");
        assert_eq!(rate(2.0 * MB), "2.0 MB/s");
        assert_eq!(rate(GB), "1.0 GB/s");
        assert_eq!(rate(-5.0), "0.0 B/s");
    }

    #[test]
    fn sizes_and_percent() {
        assert_eq!(gigabytes(8 * 1024 * 1024 * 1024), "8.0 GB");
        assert_eq!(bytes(3.0 * KB), "3.0 KB");
        assert_eq!(percent(Some(42.0)), "42.0%");
        assert_eq!(percent(None), "N/A");
        assert_eq!(celsius(Some(55.26)), "55.3°C");
        assert_eq!(celsius(None), "N/A");
        assert_eq!(to_mb(1_048_576.0), 1.0);
        assert_eq!(to_kb(2048.0), 2.0);
    }
}
