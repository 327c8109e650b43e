use async_trait::async_trait;
use hagal_core::proxy::{ProxyRequest, ProxyResponse};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use crate::transport::{Transport, TransportError};

pub(crate) const FIRST_TIMESTAMP: i64 = 1549336675000;

type Handler = Box<dyn Fn(&ProxyRequest) -> Result<ProxyResponse, TransportError> + Send + Sync>;
type Delay = Box<dyn Fn(&ProxyRequest) -> Duration + Send + Sync>;

/// Transport answering from a closure and recording what it was sent.
pub(crate) struct MockTransport {
    handler: Handler,
    delay: Option<Delay>,
    sent: Mutex<Vec<ProxyRequest>>,
}

impl MockTransport {
    pub(crate) fn new(
        handler: impl Fn(&ProxyRequest) -> Result<ProxyResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Answers every datapoints request with `count` points per requested id.
    pub(crate) fn datapoints(count: usize) -> Self {
        Self::new(move |request| Ok(ok(datapoints_body(request, count))))
    }

    pub(crate) fn with_delay(
        mut self,
        delay: impl Fn(&ProxyRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub(crate) fn sent(&self) -> Vec<ProxyRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ProxyRequest) -> Result<ProxyResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(request)).await;
        }
        (self.handler)(request)
    }
}

pub(crate) fn ok(data: Value) -> ProxyResponse {
    ProxyResponse { status: 200, data }
}

/// Datapoints spaced ten minutes apart from the request start, valued 0, 1, 2...
/// under the requested aggregate, or under `value` for raw requests.
pub(crate) fn datapoints_body(request: &ProxyRequest, count: usize) -> Value {
    let data = request.data.as_ref().expect("datapoints request has a body");
    let key = data
        .aggregates
        .as_ref()
        .and_then(|aggs| aggs.first())
        .map(|agg| agg.as_str())
        .unwrap_or("value");
    let start = data
        .start
        .or_else(|| data.items.first().and_then(|item| item.start))
        .unwrap_or(FIRST_TIMESTAMP);

    let items: Vec<Value> = data
        .items
        .iter()
        .map(|item| {
            let datapoints: Vec<Value> = (0..count)
                .map(|i| json!({"timestamp": start + i as i64 * 600_000, key: i}))
                .collect();
            json!({"id": item.id, "datapoints": datapoints})
        })
        .collect();

    json!({ "items": items })
}

pub(crate) fn requested_id(request: &ProxyRequest) -> Option<&str> {
    request
        .data
        .as_ref()
        .and_then(|data| data.items.first())
        .map(|item| item.id.as_str())
}
