mod client;
mod query;
mod search;
mod time_range;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use client::Connection;
use query::Query;
use search::Search;

#[derive(Debug, Parser)]
#[command(name = "hagal-cli")]
#[command(about = "A command-line tool to query time series from the Hagal metrics API")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: Connection,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Fetch datapoints for one or more time series")]
    Query(Query),

    #[command(about = "Search the available time series by id or name")]
    Search(Search),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so that stdout only carries the command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query(query) => query::handle_query(query, &cli.connection).await?,
        Commands::Search(search) => search::handle_search(search, &cli.connection).await?,
    }

    Ok(())
}
