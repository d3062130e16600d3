/*!
 * Timestamp formatting and TTML time expressions.
 *
 * `begin` values are read as seconds, offset time or clock time and
 * rendered as the `[HH:MM:SS]` line prefix.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// Clock time, HH:MM:SS with optional fraction
static CLOCK_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):([0-5]\d):([0-5]\d(?:\.\d+)?)$").unwrap()
});

// Offset time with a metric suffix
static OFFSET_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(h|m|s|ms)$").unwrap()
});

/// Format a seconds offset as `HH:MM:SS`.
///
/// Fractions are truncated, not rounded. Every field is at least two digits
/// wide and the hours field grows past 99 as needed. Negative and NaN input
/// saturates to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse a `begin` attribute into seconds.
///
/// Accepts bare seconds (`12.5`), offset time (`12.5s`, `1500ms`, `2m`, `1h`)
/// and clock time (`00:01:02.250`). Returns `None` for anything else,
/// including non-finite numbers.
pub fn parse_time_expression(value: &str) -> Option<f64> {
    let value = value.trim();

    if let Some(caps) = CLOCK_TIME_REGEX.captures(value) {
        let hours: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        let seconds: f64 = caps[3].parse().ok()?;
        return Some(hours * 3600.0 + minutes * 60.0 + seconds);
    }

    if let Some(caps) = OFFSET_TIME_REGEX.captures(value) {
        let amount: f64 = caps[1].parse().ok()?;
        let seconds = match &caps[2] {
            "h" => amount * 3600.0,
            "m" => amount * 60.0,
            "ms" => amount / 1000.0,
            _ => amount,
        };
        return Some(seconds);
    }

    value.parse::<f64>().ok().filter(|seconds| seconds.is_finite())
}
