//! JSON shapes exchanged with the Hagal metrics API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

use crate::query::Aggregation;

pub const DATAPOINTS_LIST_ENDPOINT: &str = "/datapoints/list";
pub const DATAPOINTS_AGGREGATE_ENDPOINT: &str = "/datapoints/aggregate";
pub const DATAPOINTS_PRECOMPUTED_ENDPOINT: &str = "/datapoints/precomputed-aggregates";
pub const TIMESERIES_FILTER_ENDPOINT: &str = "/timeseries/filter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
    Get,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Get => write!(f, "GET"),
        }
    }
}

/// Per-item part of a datapoints request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQueryRequestItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl DataQueryRequestItem {
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: None,
            end: None,
            limit: None,
        }
    }
}

/// Request body of the datapoints endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequestData {
    pub items: Vec<DataQueryRequestItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<Vec<Aggregation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub ignore_unknown_ids: bool,
}

/// A request as handed to the transport: endpoint path relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
    pub endpoint: String,
    pub method: HttpMethod,
    pub data: Option<ProxyRequestData>,
}

impl ProxyRequest {
    pub fn post(endpoint: impl Into<String>, data: Option<ProxyRequestData>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Post,
            data,
        }
    }
}

/// Successful answer of the backend: status plus the undecoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: u16,
    pub data: Value,
}

/// One datapoint as returned by either the raw or the aggregate endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPointItem {
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<f64>,
}

impl DataPointItem {
    pub fn raw(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn aggregated(timestamp: i64, aggregation: Aggregation, value: f64) -> Self {
        let mut point = Self {
            timestamp,
            ..Default::default()
        };
        *point.slot_mut(aggregation) = Some(value);
        point
    }

    pub fn aggregate(&self, aggregation: Aggregation) -> Option<f64> {
        match aggregation {
            Aggregation::Average => self.average,
            Aggregation::Max => self.max,
            Aggregation::Min => self.min,
            Aggregation::Sum => self.sum,
            Aggregation::Count => self.count,
            Aggregation::Interpolation => self.interpolation,
        }
    }

    fn slot_mut(&mut self, aggregation: Aggregation) -> &mut Option<f64> {
        match aggregation {
            Aggregation::Average => &mut self.average,
            Aggregation::Max => &mut self.max,
            Aggregation::Min => &mut self.min,
            Aggregation::Sum => &mut self.sum,
            Aggregation::Count => &mut self.count,
            Aggregation::Interpolation => &mut self.interpolation,
        }
    }
}

/// A time series with its datapoints, as found in `items` of datapoints responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponseDataItem {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub datapoints: Vec<DataPointItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponseData {
    pub items: Vec<ProxyResponseDataItem>,
}

/// Resource entry of `/timeseries/filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceListData {
    #[serde(default)]
    pub items: Vec<ResourceItem>,
}

// Resource ids come back either as strings or as bare numbers.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
