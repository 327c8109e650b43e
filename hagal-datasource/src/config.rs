//! Datasource configuration file parsing

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{
    errors::{DatasourceError, Result},
    request_builder::RequestDefaults,
};

pub const DEFAULT_API_URL: &str = "https://api.hagal.com/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Connection settings of a datasource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasourceConfig {
    /// Root of the metrics API; endpoints are appended to it
    pub api_url: String,

    /// Per-request timeout enforced by the transport
    pub request_timeout_ms: u64,

    /// Sent as `ignoreUnknownIds` with every datapoints request
    pub ignore_unknown_ids: bool,
}

impl Default for DatasourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            ignore_unknown_ids: false,
        }
    }
}

impl DatasourceConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: DatasourceConfig = serde_yaml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(DatasourceError::InvalidConfig(
                "api_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DatasourceError::InvalidConfig(format!(
                "api_url must use http or https: {}",
                url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(DatasourceError::InvalidConfig(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            ignore_unknown_ids: self.ignore_unknown_ids,
        }
    }
}
