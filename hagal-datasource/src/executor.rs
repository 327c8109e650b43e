use futures::future::join_all;
use hagal_core::proxy::{ProxyResponse, ProxyResponseData};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    errors::Result,
    events::{EventPublisher, FailedRequestEvent},
    merger::PartialSeriesResult,
    request_builder::RequestDescriptor,
    transport::{Transport, TransportError},
};

/// What happened to one submitted request.
///
/// `partial` is always usable: it is empty when the call failed or the
/// response had an unexpected shape.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub descriptor: RequestDescriptor,
    pub response: std::result::Result<ProxyResponse, TransportError>,
    pub partial: PartialSeriesResult,
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        self.response.is_err()
    }
}

/// Sends every descriptor at once and waits for all of them.
///
/// Outcomes come back in submission order whatever the completion order was.
/// A failed request publishes one [`FailedRequestEvent`] and yields an empty
/// partial result; only an unavailable transport fails the call.
pub async fn execute(
    transport: &dyn Transport,
    descriptors: Vec<RequestDescriptor>,
    request_id: &str,
    events: &EventPublisher,
) -> Result<Vec<FetchOutcome>> {
    debug!(
        request_id = %request_id,
        requests = descriptors.len(),
        "dispatching datapoint requests"
    );

    let responses = join_all(descriptors.into_iter().map(|descriptor| async move {
        let response = transport.send(&descriptor.request).await;
        (descriptor, response)
    }))
    .await;

    if let Some(err) = responses.iter().find_map(|(_, response)| match response {
        Err(err) if err.is_unavailable() => Some(err.clone()),
        _ => None,
    }) {
        return Err(err.into());
    }

    let outcomes = responses
        .into_iter()
        .map(|(descriptor, response)| {
            let partial = match &response {
                Ok(resp) => decode_partial(&descriptor, resp),
                Err(err) => {
                    events.publish(FailedRequestEvent::new(
                        descriptor.ref_id(),
                        request_id,
                        err.to_string(),
                    ));
                    PartialSeriesResult::empty(&descriptor.series)
                }
            };
            FetchOutcome {
                descriptor,
                response,
                partial,
            }
        })
        .collect();

    Ok(outcomes)
}

fn decode_partial(descriptor: &RequestDescriptor, resp: &ProxyResponse) -> PartialSeriesResult {
    match ProxyResponseData::deserialize(&resp.data) {
        Ok(data) => {
            let datapoints = data
                .items
                .into_iter()
                .next()
                .map(|item| item.datapoints)
                .unwrap_or_default();
            PartialSeriesResult::new(&descriptor.series, datapoints)
        }
        Err(e) => {
            warn!(
                ref_id = %descriptor.ref_id(),
                endpoint = %descriptor.endpoint(),
                "malformed response, treating as empty: {}",
                e
            );
            PartialSeriesResult::empty(&descriptor.series)
        }
    }
}
