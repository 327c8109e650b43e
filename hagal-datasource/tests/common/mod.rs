use async_trait::async_trait;
use hagal_datasource::{ProxyRequest, ProxyResponse, Transport, TransportError};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Mutex;

pub const FIRST_TIMESTAMP: i64 = 1549336675000;
pub const HALF_HOUR_END: i64 = 1549338475000;

type Handler = Box<dyn Fn(&ProxyRequest) -> Result<ProxyResponse, TransportError> + Send + Sync>;

/// Stand-in for the metrics API, answering from a closure.
pub struct FakeApi {
    handler: Handler,
    sent: Mutex<Vec<ProxyRequest>>,
}

impl FakeApi {
    pub fn new(
        handler: impl Fn(&ProxyRequest) -> Result<ProxyResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Serves `/timeseries/filter` from a fixed list and datapoints for everything else.
    pub fn standard() -> Self {
        Self::new(|request| {
            if request.endpoint == "/timeseries/filter" {
                Ok(ok(timeseries_list()))
            } else {
                Ok(ok(datapoints_body(request, 5)))
            }
        })
    }

    #[allow(dead_code)]
    pub fn sent(&self) -> Vec<ProxyRequest> {
        self.sent.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn sent_to(&self, endpoint: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }
}

impl fmt::Debug for FakeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FakeApi")
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn send(&self, request: &ProxyRequest) -> Result<ProxyResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

pub fn ok(data: Value) -> ProxyResponse {
    ProxyResponse { status: 200, data }
}

pub fn timeseries_list() -> Value {
    json!({
        "items": [
            {"id": "SOC-battery-1", "name": "State of charge"},
            {"id": "pv-power", "name": "PV inverter SOC estimate"},
            {"id": "grid-frequency", "name": ""},
            {"id": 1001}
        ]
    })
}

pub fn datapoints_body(request: &ProxyRequest, count: usize) -> Value {
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

#[allow(dead_code)]
pub fn requested_id(request: &ProxyRequest) -> Option<&str> {
    request
        .data
        .as_ref()
        .and_then(|data| data.items.first())
        .map(|item| item.id.as_str())
}
