//! Human-readable byte size formatting
//!
//! Used for per-pack progress lines and the end-of-run summary.

const UNITS: [&str; 8] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];

/// Format a byte count with binary-prefixed units, one decimal place.
pub fn format_human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.1}{}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1}YiB", value)
}
