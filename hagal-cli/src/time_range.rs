use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use hagal_datasource::{parse_granularity, TimeWindow};

/// Window length used when `--from` is omitted.
pub const DEFAULT_LOOKBACK_MS: i64 = 60 * 60 * 1000;

/// Parses a time bound given as epoch milliseconds, RFC 3339, `now` or
/// `now-<n><s|m|h|d>`.
pub fn parse_time(input: &str, now: DateTime<Utc>) -> Result<i64> {
    let input = input.trim();

    if let Ok(ms) = input.parse::<i64>() {
        return Ok(ms);
    }
    if input == "now" {
        return Ok(now.timestamp_millis());
    }
    if let Some(offset) = input.strip_prefix("now-") {
        let seconds = parse_granularity(offset)
            .map_err(|_| anyhow!("invalid relative time '{}'", input))?;
        let offset_ms = i64::try_from(seconds)
            .ok()
            .and_then(|s| s.checked_mul(1000))
            .ok_or_else(|| anyhow!("relative time '{}' is out of range", input))?;
        return Ok(now.timestamp_millis().saturating_sub(offset_ms));
    }

    let parsed = DateTime::parse_from_rfc3339(input)
        .map_err(|e| anyhow!("invalid time '{}': {}", input, e))?;
    Ok(parsed.timestamp_millis())
}

/// Builds the query window, ending now and spanning an hour unless told otherwise.
pub fn resolve_window(from: Option<&str>, to: Option<&str>, now: DateTime<Utc>) -> Result<TimeWindow> {
    let end = match to {
        Some(to) => parse_time(to, now)?,
        None => now.timestamp_millis(),
    };
    let start = match from {
        Some(from) => parse_time(from, now)?,
        None => end.saturating_sub(DEFAULT_LOOKBACK_MS),
    };

    let window = TimeWindow::new(start, end);
    if !window.is_valid() {
        bail!("--from must be earlier than --to, got {}", window);
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1549338475000).unwrap()
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("1549336675000", now()).unwrap(), 1549336675000);
        assert_eq!(parse_time("now", now()).unwrap(), 1549338475000);
        assert_eq!(parse_time("now-30m", now()).unwrap(), 1549336675000);
        assert_eq!(
            parse_time("2019-02-05T03:17:55Z", now()).unwrap(),
            1549336675000
        );
        assert_eq!(
            parse_time("2019-02-05T04:17:55+01:00", now()).unwrap(),
            1549336675000
        );
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time("yesterday", now()).is_err());
        assert!(parse_time("now-2w", now()).is_err());
    }

    #[test]
    fn test_default_window_is_last_hour() {
        let window = resolve_window(None, None, now()).unwrap();
        assert_eq!(window.end, 1549338475000);
        assert_eq!(window.duration_ms(), DEFAULT_LOOKBACK_MS);
    }

    #[test]
    fn test_extreme_epoch_bounds() {
        let window = resolve_window(Some("-9223372036854775808"), Some("0"), now()).unwrap();
        assert_eq!(window.duration_ms(), i64::MAX);

        let window = resolve_window(None, Some("-9223372036854775800"), now()).unwrap();
        assert_eq!(window.start, i64::MIN);
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let err = resolve_window(Some("now"), Some("now-1h"), now()).unwrap_err();
        assert!(err.to_string().contains("--from must be earlier than --to"));
    }
}
