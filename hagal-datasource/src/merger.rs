use hagal_core::proxy::DataPointItem;
use hagal_core::query::SeriesRequest;
use std::collections::HashMap;

use crate::executor::FetchOutcome;

/// Datapoints returned by one backend request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialSeriesResult {
    pub ref_id: String,
    pub resource_id: String,
    pub datapoints: Vec<DataPointItem>,
}

impl PartialSeriesResult {
    pub fn empty(series: &SeriesRequest) -> Self {
        Self::new(series, Vec::new())
    }

    pub fn new(series: &SeriesRequest, datapoints: Vec<DataPointItem>) -> Self {
        Self {
            ref_id: series.ref_id.clone(),
            resource_id: series.id.clone(),
            datapoints,
        }
    }
}

/// All datapoints of one series, in sub-window order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSeriesResult {
    pub ref_id: String,
    pub resource_id: String,
    // the series that opened the group
    pub series: SeriesRequest,
    pub datapoints: Vec<DataPointItem>,
}

/// Groups fetch outcomes by `ref_id`.
///
/// Groups appear in the order their first outcome was submitted; within a
/// group, datapoints are concatenated in submission order. Runs only after
/// every fetch has completed.
pub fn merge_results(outcomes: Vec<FetchOutcome>) -> Vec<MergedSeriesResult> {
    let mut merged: Vec<MergedSeriesResult> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for outcome in outcomes {
        let FetchOutcome {
            descriptor,
            partial,
            ..
        } = outcome;

        match index.get(&partial.ref_id) {
            Some(&position) => merged[position].datapoints.extend(partial.datapoints),
            None => {
                index.insert(partial.ref_id.clone(), merged.len());
                merged.push(MergedSeriesResult {
                    ref_id: partial.ref_id,
                    resource_id: partial.resource_id,
                    series: descriptor.series,
                    datapoints: partial.datapoints,
                });
            }
        }
    }

    merged
}
