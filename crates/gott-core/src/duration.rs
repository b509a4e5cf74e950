//! Duration text formats.
//!
//! Edit documents and the `track` command use the compact unit notation
//! familiar from Go (`1h30m`, `45m`, `90s`, `1.5h`). Summaries use a clock
//! notation (`01:30`).

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;
use thiserror::Error;

/// The text could not be read as a duration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid duration {0:?}")]
pub struct DurationParseError(pub String);

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:(?:\d+\.?\d*|\.\d+)(?:ns|us|µs|μs|ms|s|m|h))+$").unwrap()
});

static COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*|\.\d+)(ns|us|µs|μs|ms|s|m|h)").unwrap());

const NANOS_PER_MS: f64 = 1_000_000.0;

fn unit_nanos(unit: &str) -> f64 {
    match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1_000.0,
        "ms" => NANOS_PER_MS,
        "s" => 1_000.0 * NANOS_PER_MS,
        "m" => 60_000.0 * NANOS_PER_MS,
        _ => 3_600_000.0 * NANOS_PER_MS,
    }
}

/// Parses a unit-suffixed duration such as `1h30m`, `45m`, `2.5h` or `0`.
#[allow(clippy::cast_possible_truncation)]
pub fn parse(s: &str) -> Result<Duration, DurationParseError> {
    let err = || DurationParseError(s.to_string());
    if matches!(s, "0" | "+0" | "-0") {
        return Ok(Duration::zero());
    }
    if !DURATION_RE.is_match(s) {
        return Err(err());
    }

    let mut nanos = 0.0_f64;
    for caps in COMPONENT_RE.captures_iter(s) {
        let value: f64 = caps[1].parse().map_err(|_| err())?;
        nanos += value * unit_nanos(&caps[2]);
    }
    if s.starts_with('-') {
        nanos = -nanos;
    }
    if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
        return Err(err());
    }
    Ok(Duration::nanoseconds(nanos.round() as i64))
}

/// Formats a duration in unit notation (`1h30m0s`, `45m0s`, `0s`).
///
/// Precision is whole milliseconds, which is what the store keeps.
pub fn format(d: Duration) -> String {
    let total_ms = d.num_milliseconds();
    if total_ms == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if total_ms < 0 {
        out.push('-');
    }
    let ms = total_ms.unsigned_abs();
    if ms < 1_000 {
        out.push_str(&format!("{ms}ms"));
        return out;
    }

    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1_000) % 60;
    let fraction = ms % 1_000;

    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}"));
    if fraction > 0 {
        let digits = format!("{fraction:03}");
        out.push_str(&format!(".{}", digits.trim_end_matches('0')));
    }
    out.push('s');
    out
}

/// Formats a duration as `HH:MM`, rounded to the nearest minute.
/// Negative durations render as `00:00`.
pub fn format_clock(d: Duration) -> String {
    let ms = d.num_milliseconds().max(0);
    let total_minutes = (ms + 30_000) / 60_000;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
pub mod millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = i64::deserialize(deserializer)?;
        Duration::try_milliseconds(ms).ok_or_else(|| de::Error::custom("duration out of range"))
    }
}
