use hagal_core::query::TimeWindow;
use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, DatasourceError>;

/// Errors that fail a whole query or the construction of a datasource.
///
/// Failures of a single backend request never show up here; they are reported
/// through the notification channel instead.
#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("invalid granularity '{0}': expected <integer><s|m|h|d>")]
    ParseError(String),

    #[error("invalid time window {0}: end must be after start")]
    InvalidTimeWindow(TimeWindow),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unable to read the configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("unable to parse the configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("unable to build the http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
