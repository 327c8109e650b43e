use hagal_core::proxy::{ProxyRequest, ResourceItem, ResourceListData, TIMESERIES_FILTER_ENDPOINT};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{errors::Result, transport::Transport};

/// A selectable time series, as offered by a series picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOption {
    pub value: String,
    pub label: String,
}

impl From<ResourceItem> for ResourceOption {
    fn from(item: ResourceItem) -> Self {
        let label = match item.name {
            Some(name) if !name.is_empty() => name,
            _ => item.id.clone(),
        };
        Self {
            value: item.id,
            label,
        }
    }
}

/// Lists the time series known to the backend.
///
/// The list is fetched once and reused; a failed fetch is retried on the next call.
#[derive(Debug)]
pub struct OptionsProvider {
    transport: Arc<dyn Transport>,
    options: OnceCell<Vec<ResourceOption>>,
}

impl OptionsProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            options: OnceCell::new(),
        }
    }

    pub async fn options(&self) -> Result<&[ResourceOption]> {
        let options = self.options.get_or_try_init(|| self.load()).await?;
        Ok(options.as_slice())
    }

    /// Options whose id or label contains `query`, ignoring case.
    pub async fn search(&self, query: &str) -> Result<Vec<ResourceOption>> {
        let query = query.to_lowercase();
        let options = self.options().await?;

        Ok(options
            .iter()
            .filter(|option| {
                option.value.to_lowercase().contains(&query)
                    || option.label.to_lowercase().contains(&query)
            })
            .cloned()
            .collect())
    }

    /// The option with exactly this resource id.
    pub async fn resolve_series_label(&self, id: &str) -> Result<Option<ResourceOption>> {
        let options = self.options().await?;
        Ok(options.iter().find(|option| option.value == id).cloned())
    }

    async fn load(&self) -> Result<Vec<ResourceOption>> {
        let response = self
            .transport
            .send(&ProxyRequest::post(TIMESERIES_FILTER_ENDPOINT, None))
            .await?;

        let items = match serde_json::from_value::<ResourceListData>(response.data) {
            Ok(data) => data.items,
            Err(e) => {
                debug!("time series list without items: {}", e);
                Vec::new()
            }
        };

        info!(count = items.len(), "loaded time series options");
        Ok(items.into_iter().map(ResourceOption::from).collect())
    }
}
