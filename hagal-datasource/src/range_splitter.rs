use hagal_core::{query::TimeWindow, DAY_MS};
use regex::Regex;
use std::sync::LazyLock;

use crate::errors::{DatasourceError, Result};

// Granularities of at least one hour are served from daily rollups.
const ROLLUP_MIN_GRANULARITY_SECS: u64 = 3600;

static GRANULARITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([smhd])$").expect("Could not compile regex"));

/// A portion of the query window, fetched with one backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubWindow {
    pub window: TimeWindow,
    // ask the backend for its precomputed rollups instead of live aggregation
    pub precomputed: bool,
}

impl SubWindow {
    pub fn live(window: TimeWindow) -> Self {
        Self {
            window,
            precomputed: false,
        }
    }
}

/// Parses a granularity such as `30s` or `1h` into seconds.
pub fn parse_granularity(granularity: &str) -> Result<u64> {
    let caps = GRANULARITY_RE
        .captures(granularity)
        .ok_or_else(|| DatasourceError::ParseError(granularity.to_string()))?;

    let amount: u64 = caps[1]
        .parse()
        .map_err(|_| DatasourceError::ParseError(granularity.to_string()))?;
    let unit = match &caps[2] {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => 86400,
    };

    amount
        .checked_mul(unit)
        .ok_or_else(|| DatasourceError::ParseError(granularity.to_string()))
}

/// Decides the sub-windows fetched for one series.
///
/// Aggregated series with a granularity of one hour or more over a window
/// longer than a day are split in two: everything but the last day comes from
/// precomputed rollups, the last day is aggregated live. Everything else is a
/// single live window.
pub fn split_range(
    window: TimeWindow,
    raw_data_enabled: bool,
    granularity: Option<&str>,
) -> Result<Vec<SubWindow>> {
    if raw_data_enabled {
        return Ok(vec![SubWindow::live(window)]);
    }

    let granularity_secs = match granularity {
        Some(granularity) => parse_granularity(granularity)?,
        None => return Ok(vec![SubWindow::live(window)]),
    };

    if granularity_secs >= ROLLUP_MIN_GRANULARITY_SECS && window.duration_ms() > DAY_MS {
        let breakpoint = window.end - DAY_MS;
        return Ok(vec![
            SubWindow {
                window: TimeWindow::new(window.start, breakpoint),
                precomputed: true,
            },
            SubWindow::live(TimeWindow::new(breakpoint, window.end)),
        ]);
    }

    Ok(vec![SubWindow::live(window)])
}
