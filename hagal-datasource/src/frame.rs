use hagal_core::query::SeriesRequest;
use serde::Serialize;

use crate::merger::MergedSeriesResult;

pub const TARGET_FIELD: &str = "target";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Output table of one series.
///
/// Columns are `target` (the resource id on every row), `timestamp` and a
/// numeric column named after the series label. A value is `None` when the
/// backend omitted it for that datapoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFrame {
    pub ref_id: String,
    pub name: String,
    pub target: Vec<String>,
    pub timestamp: Vec<i64>,
    pub values: Vec<Option<f64>>,
}

impl DataFrame {
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    pub fn field_names(&self) -> [&str; 3] {
        [TARGET_FIELD, TIMESTAMP_FIELD, &self.name]
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, i64, Option<f64>)> + '_ {
        self.target
            .iter()
            .zip(&self.timestamp)
            .zip(&self.values)
            .map(|((target, ts), value)| (target.as_str(), *ts, *value))
    }
}

/// Builds the output table of `series` from its merged datapoints.
pub fn build_frame(merged: &MergedSeriesResult, series: &SeriesRequest) -> DataFrame {
    let name = series.display_label().to_string();
    let rows = merged.datapoints.len();

    let values = merged
        .datapoints
        .iter()
        .map(|point| {
            if series.raw_data_enabled {
                point.value
            } else {
                point.aggregate(series.aggregation)
            }
        })
        .collect();

    DataFrame {
        ref_id: merged.ref_id.clone(),
        name,
        target: vec![merged.resource_id.clone(); rows],
        timestamp: merged.datapoints.iter().map(|p| p.timestamp).collect(),
        values,
    }
}
