use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Aggregation function applied by the backend to each granularity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Average,
    Max,
    Min,
    Sum,
    Count,
    Interpolation,
}

impl Aggregation {
    pub const ALL: [Aggregation; 6] = [
        Aggregation::Average,
        Aggregation::Max,
        Aggregation::Min,
        Aggregation::Sum,
        Aggregation::Count,
        Aggregation::Interpolation,
    ];

    /// The key under which the backend reports this aggregate in a datapoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Average => "average",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Interpolation => "interpolation",
        }
    }
}

impl Display for Aggregation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aggregation::ALL
            .into_iter()
            .find(|agg| agg.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown aggregation: {}", s))
    }
}

/// A single series requested by the user.
///
/// `ref_id` correlates every backend call issued for this series; it must be
/// unique among the series of one query. When `raw_data_enabled` is set the
/// aggregation and granularity do not shape the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest {
    pub ref_id: String,
    // resource id of the time series on the backend
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<String>,
    #[serde(default)]
    pub raw_data_enabled: bool,
    #[serde(default)]
    pub hide: bool,
}

impl Default for SeriesRequest {
    fn default() -> Self {
        Self {
            ref_id: String::new(),
            id: String::new(),
            label: None,
            name: None,
            aggregation: Aggregation::Average,
            granularity: Some("2s".to_string()),
            raw_data_enabled: false,
            hide: false,
        }
    }
}

impl SeriesRequest {
    pub fn new(ref_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_granularity(mut self, granularity: impl Into<String>) -> Self {
        self.granularity = Some(granularity.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw_data_enabled = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    /// Column label for this series: explicit label, then display name, then resource id.
    pub fn display_label(&self) -> &str {
        [self.label.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Absolute time window in milliseconds since epoch, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Length of the window, saturating at `i64::MAX` for extreme bounds.
    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Everything needed to run one query: the series, the shared window and the
/// id the caller uses to recognise notifications belonging to this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub request_id: String,
    pub range: TimeWindow,
    pub targets: Vec<SeriesRequest>,
}

impl QueryRequest {
    pub fn new(request_id: impl Into<String>, range: TimeWindow, targets: Vec<SeriesRequest>) -> Self {
        Self {
            request_id: request_id.into(),
            range,
            targets,
        }
    }
}
