//! Hagal-Datasource
//!
//! Turns declarative per-series queries into calls against the Hagal metrics API
//! and reassembles the answers into one table per series.
//!
//! A query flows through the range splitter, the request builder, the fetch
//! executor (all calls in flight at once), the merger and the frame builder.
//! Failures of a single series are reported on an [`EventPublisher`] and leave an
//! empty frame behind; only malformed configuration or an unusable transport
//! fails the whole query.

mod config;
pub use config::DatasourceConfig;

mod datasource;
pub use datasource::{DataError, DataQueryResponse, DataSource, DataSourceBuilder};

pub mod errors;
pub use errors::DatasourceError;

mod events;
pub use events::{drain_events, EventPublisher, FailedRequestEvent};

mod executor;
pub use executor::{execute, FetchOutcome};

mod frame;
pub use frame::{build_frame, DataFrame, TARGET_FIELD, TIMESTAMP_FIELD};

mod http_transport;
pub use http_transport::HttpTransport;

mod merger;
pub use merger::{merge_results, MergedSeriesResult, PartialSeriesResult};

#[cfg(test)]
mod mock_transport;

mod options;
pub use options::{OptionsProvider, ResourceOption};

mod pipeline;
pub use pipeline::TimeseriesDatasource;

mod range_splitter;
pub use range_splitter::{parse_granularity, split_range, SubWindow};

mod request_builder;
pub use request_builder::{
    build_request, RequestDefaults, RequestDescriptor, AGGREGATE_LIMIT, RAW_LIMIT,
};

mod transport;
pub use transport::{BackendError, Transport, TransportError, UNKNOWN_ERROR};

pub use hagal_core::proxy::{DataPointItem, HttpMethod, ProxyRequest, ProxyResponse};
pub use hagal_core::query::{Aggregation, QueryRequest, SeriesRequest, TimeWindow};
