use anyhow::{Context, Result};
use clap::Args;
use hagal_datasource::{DataSource, DatasourceConfig};
use std::path::PathBuf;

/// Where and how to reach the metrics API, shared by all subcommands.
#[derive(Debug, Args)]
pub struct Connection {
    #[arg(
        long,
        global = true,
        env = "HAGAL_CONFIG",
        help = "YAML file with the datasource settings (api_url, request_timeout_ms, ignore_unknown_ids)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "HAGAL_API_URL",
        help = "Root URL of the metrics API, overrides the config file. Default: https://api.hagal.com/api/v1"
    )]
    pub api_url: Option<String>,
}

impl Connection {
    pub fn load_config(&self) -> Result<DatasourceConfig> {
        let mut config = match &self.config {
            Some(path) => DatasourceConfig::from_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => DatasourceConfig::default(),
        };

        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        Ok(config)
    }

    pub fn datasource(&self, ignore_unknown_ids: bool) -> Result<DataSource> {
        let mut config = self.load_config()?;
        config.ignore_unknown_ids |= ignore_unknown_ids;

        DataSource::builder()
            .with_config(config)
            .build()
            .context("Failed to create datasource")
    }
}
