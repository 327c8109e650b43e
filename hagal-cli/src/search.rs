use anyhow::{Context, Result};
use clap::Parser;
use prettytable::{format, Cell, Row, Table};

use crate::{client::Connection, OutputFormat};

#[derive(Debug, Parser)]
pub struct Search {
    #[arg(
        default_value = "",
        help = "Text to look for in time series ids and names, ignoring case. Lists everything when empty"
    )]
    pub query: String,

    #[arg(long, short = 'o', value_enum, default_value = "table", help = "Output format")]
    pub output: OutputFormat,
}

pub async fn handle_search(search: Search, connection: &Connection) -> Result<()> {
    let datasource = connection.datasource(false)?;
    let options = datasource
        .options()
        .search(&search.query)
        .await
        .context("Failed to list time series")?;

    match search.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
            table.add_row(Row::new(vec![Cell::new("ID"), Cell::new("LABEL")]));
            for option in &options {
                table.add_row(Row::new(vec![
                    Cell::new(&option.value),
                    Cell::new(&option.label),
                ]));
            }
            table.printstd();
        }
    }

    Ok(())
}
