use hagal_core::proxy::{
    DataQueryRequestItem, ProxyRequest, ProxyRequestData, DATAPOINTS_AGGREGATE_ENDPOINT,
    DATAPOINTS_LIST_ENDPOINT, DATAPOINTS_PRECOMPUTED_ENDPOINT,
};
use hagal_core::query::SeriesRequest;

use crate::range_splitter::SubWindow;

/// Raw fetches are unbounded.
pub const RAW_LIMIT: u32 = 0;
pub const AGGREGATE_LIMIT: u32 = 3000;

/// Body fields merged into every datapoints request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestDefaults {
    pub ignore_unknown_ids: bool,
}

/// One unit of work for the transport, tied to the series it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub request: ProxyRequest,
    pub series: SeriesRequest,
    pub sub_window: SubWindow,
}

impl RequestDescriptor {
    pub fn ref_id(&self) -> &str {
        &self.series.ref_id
    }

    pub fn endpoint(&self) -> &str {
        &self.request.endpoint
    }
}

/// Builds the backend request fetching `sub_window` of `series`.
pub fn build_request(
    series: &SeriesRequest,
    sub_window: &SubWindow,
    defaults: &RequestDefaults,
) -> RequestDescriptor {
    let window = sub_window.window;

    let (endpoint, data) = if series.raw_data_enabled {
        let data = ProxyRequestData {
            items: vec![DataQueryRequestItem {
                id: series.id.clone(),
                start: Some(window.start),
                end: Some(window.end),
                limit: Some(RAW_LIMIT),
            }],
            start: None,
            end: None,
            aggregates: None,
            granularity: None,
            limit: None,
            ignore_unknown_ids: defaults.ignore_unknown_ids,
        };
        (DATAPOINTS_LIST_ENDPOINT, data)
    } else {
        let endpoint = if sub_window.precomputed {
            DATAPOINTS_PRECOMPUTED_ENDPOINT
        } else {
            DATAPOINTS_AGGREGATE_ENDPOINT
        };
        let data = ProxyRequestData {
            items: vec![DataQueryRequestItem::id_only(series.id.clone())],
            start: Some(window.start),
            end: Some(window.end),
            aggregates: Some(vec![series.aggregation]),
            granularity: series.granularity.clone(),
            limit: Some(AGGREGATE_LIMIT),
            ignore_unknown_ids: defaults.ignore_unknown_ids,
        };
        (endpoint, data)
    };

    RequestDescriptor {
        request: ProxyRequest::post(endpoint, Some(data)),
        series: series.clone(),
        sub_window: *sub_window,
    }
}
