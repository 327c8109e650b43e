use hagal_core::query::QueryRequest;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use crate::{
    config::DatasourceConfig,
    errors::Result,
    events::EventPublisher,
    frame::DataFrame,
    http_transport::HttpTransport,
    options::OptionsProvider,
    pipeline::TimeseriesDatasource,
    transport::{Transport, UNKNOWN_ERROR},
};

/// Answer of [`DataSource::query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQueryResponse {
    pub data: Vec<DataFrame>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DataError>,
}

/// A failure of the query as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataError {
    pub message: String,
}

/// Entry point of the datasource: queries plus the series options lookup,
/// sharing one transport.
#[derive(Debug)]
pub struct DataSource {
    pipeline: TimeseriesDatasource,
    options: OptionsProvider,
}

impl DataSource {
    pub fn builder() -> DataSourceBuilder {
        DataSourceBuilder::default()
    }

    /// Runs `request`, leaving hidden series out.
    ///
    /// Never fails: a query-wide failure is returned as an empty `data` with a
    /// single entry in `errors`. Per-series failures go to `events`.
    pub async fn query(&self, request: &QueryRequest, events: &EventPublisher) -> DataQueryResponse {
        let mut visible = request.clone();
        visible.targets.retain(|target| !target.hide);

        match self.pipeline.query(&visible, events).await {
            Ok(data) => DataQueryResponse {
                data,
                errors: Vec::new(),
            },
            Err(e) => {
                error!(request_id = %request.request_id, "query failed: {}", e);
                let message = match e.to_string() {
                    m if m.is_empty() => UNKNOWN_ERROR.to_string(),
                    m => m,
                };
                DataQueryResponse {
                    data: Vec::new(),
                    errors: vec![DataError { message }],
                }
            }
        }
    }

    pub fn options(&self) -> &OptionsProvider {
        &self.options
    }

    /// Fills in the display name of series that have none from the options list.
    ///
    /// The request is returned unchanged when the list cannot be loaded.
    pub async fn with_resolved_names(&self, mut request: QueryRequest) -> QueryRequest {
        for target in request.targets.iter_mut() {
            let unnamed = target.name.as_deref().map_or(true, str::is_empty);
            if !unnamed || target.id.is_empty() {
                continue;
            }

            match self.options.resolve_series_label(&target.id).await {
                Ok(Some(option)) => target.name = Some(option.label),
                Ok(None) => {}
                Err(e) => {
                    warn!("unable to resolve series names: {}", e);
                    break;
                }
            }
        }
        request
    }
}

/// A builder for configuring and creating a `DataSource` instance.
///
/// Without an explicit transport, an [`HttpTransport`] is built from the configuration.
#[derive(Debug, Default)]
pub struct DataSourceBuilder {
    config: DatasourceConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl DataSourceBuilder {
    pub fn with_config(mut self, config: DatasourceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.request_timeout_ms = timeout_ms;
        self
    }

    pub fn ignore_unknown_ids(mut self, ignore: bool) -> Self {
        self.config.ignore_unknown_ids = ignore;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<DataSource> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::from_config(&self.config)?),
        };

        Ok(DataSource {
            pipeline: TimeseriesDatasource::new(
                transport.clone(),
                self.config.request_defaults(),
            ),
            options: OptionsProvider::new(transport),
        })
    }
}
