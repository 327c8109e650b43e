use hagal_core::query::QueryRequest;
use std::sync::Arc;
use tracing::debug;

use crate::{
    errors::{DatasourceError, Result},
    events::EventPublisher,
    executor::execute,
    frame::{build_frame, DataFrame},
    merger::merge_results,
    range_splitter::split_range,
    request_builder::{build_request, RequestDefaults, RequestDescriptor},
    transport::Transport,
};

/// Runs time-series queries against the metrics API.
#[derive(Debug, Clone)]
pub struct TimeseriesDatasource {
    transport: Arc<dyn Transport>,
    defaults: RequestDefaults,
}

impl TimeseriesDatasource {
    pub fn new(transport: Arc<dyn Transport>, defaults: RequestDefaults) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    /// Fetches every series of `request` and returns one frame per series.
    ///
    /// Series without a resource id are skipped. Frames follow the order of
    /// `request.targets`; a series whose requests all failed gets an empty
    /// frame and its failures are published on `events`.
    ///
    /// # Errors
    ///
    /// A malformed granularity or time window, or an unavailable transport.
    pub async fn query(
        &self,
        request: &QueryRequest,
        events: &EventPublisher,
    ) -> Result<Vec<DataFrame>> {
        if !request.range.is_valid() {
            return Err(DatasourceError::InvalidTimeWindow(request.range));
        }

        let descriptors = self.plan(request)?;
        let outcomes = execute(
            self.transport.as_ref(),
            descriptors,
            &request.request_id,
            events,
        )
        .await?;

        let frames = merge_results(outcomes)
            .iter()
            .map(|merged| build_frame(merged, &merged.series))
            .collect();

        Ok(frames)
    }

    /// Splits and builds the backend requests for every queryable series.
    pub fn plan(&self, request: &QueryRequest) -> Result<Vec<RequestDescriptor>> {
        let mut descriptors = Vec::new();

        for series in request.targets.iter().filter(|t| !t.id.is_empty()) {
            let sub_windows = split_range(
                request.range,
                series.raw_data_enabled,
                series.granularity.as_deref(),
            )?;

            debug!(
                ref_id = %series.ref_id,
                windows = sub_windows.len(),
                "planned series fetch"
            );

            descriptors.extend(
                sub_windows
                    .iter()
                    .map(|sub_window| build_request(series, sub_window, &self.defaults)),
            );
        }

        Ok(descriptors)
    }
}
