use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

/// Parse interval strings like "5s", "500ms", "1.5m"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Duration must be a non-negative number: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Parse a polling interval, rejecting zero.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let interval = parse_duration(s)?;
    if interval.is_zero() {
        bail!("Interval must be greater than zero: {}", s.trim());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_seconds() {
        let d = parse_duration("5s").unwrap();
        assert_eq!(d.as_secs(), 5);
    }

    #[test]
    fn parse_milliseconds() {
        let d = parse_duration("988.82775ms").unwrap();
        assert!((d.as_secs_f64() - 0.98882775).abs() < 0.0001);
    }

    #[test]
    fn parse_microseconds() {
        assert_eq!(parse_duration("16.958µs").unwrap().as_nanos(), 16958);
        assert_eq!(parse_duration("500us").unwrap().as_nanos(), 500_000);
    }

    #[test]
    fn parse_minutes() {
        let d = parse_duration("1.5m").unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn minutes_do_not_shadow_milliseconds() {
        assert_eq!(parse_duration("250ms").unwrap().as_millis(), 250);
    }

    #[test]
    fn parse_with_whitespace() {
        let d = parse_duration("  100ms  ").unwrap();
        assert_eq!(d.as_millis(), 100);
    }

    #[test]
    fn parse_unknown_format_fails() {
        assert!(parse_duration("100x").is_err());
        assert!(parse_duration("abcms").is_err());
    }

    #[test]
    fn parse_negative_fails() {
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(parse_duration("0s").is_ok());
        assert!(parse_interval("0s").is_err());
        assert_eq!(parse_interval("2s").unwrap().as_secs(), 2);
    }
}
