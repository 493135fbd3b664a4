//! Formatting helpers for human-readable output.

use std::time::Duration;

/// Format a byte count with binary units (e.g. "1.5 MiB", "100 B").
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Format an elapsed duration, rounded to milliseconds.
pub fn human_elapsed(elapsed: Duration) -> String {
    let rounded = Duration::from_millis(elapsed.as_millis() as u64);
    if rounded.is_zero() {
        return "0ms".to_string();
    }
    humantime::format_duration(rounded).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes_small() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
    }

    #[test]
    fn test_human_bytes_units() {
        assert_eq!(human_bytes(1024), "1.0 KiB");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(1024 * 1024), "1.0 MiB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
        assert_eq!(human_bytes(1024u64.pow(4)), "1.0 TiB");
    }

    #[test]
    fn test_human_elapsed() {
        assert_eq!(human_elapsed(Duration::ZERO), "0ms");
        assert_eq!(human_elapsed(Duration::from_micros(1_500_700)), "1s 500ms");
        assert_eq!(human_elapsed(Duration::from_secs(125)), "2m 5s");
    }
}
