use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use hagal_datasource::{
    drain_events, Aggregation, DataFrame, EventPublisher, FailedRequestEvent, QueryRequest,
    SeriesRequest,
};
use prettytable::{format, Cell, Row, Table};
use tracing::debug;

use crate::{client::Connection, time_range::resolve_window, OutputFormat};

#[derive(Debug, Parser)]
#[command(after_help = EXAMPLES_TEXT)]
pub struct Query {
    #[arg(
        long = "id",
        short = 'i',
        required = true,
        help = "Time series id to query (repeatable, one series per id)"
    )]
    pub ids: Vec<String>,

    #[arg(
        long,
        short = 'a',
        default_value = "average",
        value_parser = parse_aggregation,
        help = "Aggregate to fetch: average, max, min, sum, count, interpolation"
    )]
    pub aggregation: Aggregation,

    #[arg(
        long,
        short = 'g',
        help = "Aggregation bucket size as <integer><s|m|h|d>. Default: 2s"
    )]
    pub granularity: Option<String>,

    #[arg(long, default_value_t = false, help = "Fetch raw datapoints instead of aggregates")]
    pub raw: bool,

    #[arg(
        long = "label",
        short = 'l',
        help = "Display label for the value column, the n-th label goes to the n-th id (repeatable)"
    )]
    pub labels: Vec<String>,

    #[arg(
        long,
        help = "Start of the window: epoch ms, RFC 3339 or now-<n><s|m|h|d>. Default: one hour before --to"
    )]
    pub from: Option<String>,

    #[arg(long, help = "End of the window, same formats as --from. Default: now")]
    pub to: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Name unlabelled series after the time series name known to the API"
    )]
    pub resolve_names: bool,

    #[arg(long, default_value_t = false, help = "Ask the API to skip unknown ids instead of failing")]
    pub ignore_unknown_ids: bool,

    #[arg(long, short = 'o', value_enum, default_value = "table", help = "Output format")]
    pub output: OutputFormat,
}

const EXAMPLES_TEXT: &str = r#"
EXAMPLES:
    # Hourly averages of one series over the last two days
    hagal-cli query --id SOC-battery-1 --granularity 1h --from now-2d

    # Raw datapoints of two series between two instants
    hagal-cli query -i pv-power -i grid-frequency --raw \
        --from 2019-02-05T03:17:55Z --to 2019-02-05T03:47:55Z

    # Maximum per minute, as JSON
    hagal-cli query -i pv-power -a max -g 1m --output json
"#;

fn parse_aggregation(value: &str) -> Result<Aggregation, String> {
    value.parse()
}

/// Spreadsheet-style reference ids: A..Z, then AA, AB, ...
fn ref_id(mut index: usize) -> String {
    let mut id = String::new();
    loop {
        id.insert(0, char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    id
}

fn build_targets(query: &Query) -> Vec<SeriesRequest> {
    query
        .ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let mut series = SeriesRequest::new(ref_id(index), id.as_str())
                .with_aggregation(query.aggregation);
            if let Some(granularity) = &query.granularity {
                series = series.with_granularity(granularity.as_str());
            }
            if let Some(label) = query.labels.get(index) {
                series = series.with_label(label.as_str());
            }
            if query.raw {
                series = series.raw();
            }
            series
        })
        .collect()
}

pub async fn handle_query(query: Query, connection: &Connection) -> Result<()> {
    let datasource = connection.datasource(query.ignore_unknown_ids)?;

    let now = Utc::now();
    let window = resolve_window(query.from.as_deref(), query.to.as_deref(), now)?;
    let request_id = format!("cli-{}", now.timestamp_millis());

    let mut request = QueryRequest::new(request_id.clone(), window, build_targets(&query));
    if query.resolve_names {
        request = datasource.with_resolved_names(request).await;
    }
    debug!(request_id = %request_id, window = %window, "running query");

    let (events, mut receiver) = EventPublisher::channel();
    let response = datasource.query(&request, &events).await;
    let failures = drain_events(&mut receiver, &request_id);

    match query.output {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "request_id": request_id,
                "data": response.data,
                "errors": response.errors,
                "failures": failures,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            for frame in &response.data {
                print_frame(frame);
            }
            print_failures(&failures);
        }
    }

    if let Some(error) = response.errors.first() {
        bail!("Query failed: {}", error.message);
    }
    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

fn print_frame(frame: &DataFrame) {
    println!("{} {} ({} points)", frame.ref_id, frame.name, frame.len());
    if frame.is_empty() {
        println!();
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(
        frame
            .field_names()
            .iter()
            .map(|name| Cell::new(&name.to_uppercase()))
            .collect(),
    ));
    for (target, timestamp, value) in frame.rows() {
        table.add_row(Row::new(vec![
            Cell::new(target),
            Cell::new(&format_timestamp(timestamp)),
            Cell::new(&value.map(|v| v.to_string()).unwrap_or_default()),
        ]));
    }
    table.printstd();
    println!();
}

fn print_failures(failures: &[FailedRequestEvent]) {
    for failure in failures {
        eprintln!("Series {} failed: {}", failure.ref_id, failure.message);
    }
}
