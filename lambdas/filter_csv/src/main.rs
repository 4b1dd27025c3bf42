//! Filter CSV Lambda
//!
//! Triggered by S3 when a raw CSV lands. Keeps only rows whose
//! `metric_name` is on the environmental metric allow-list and replaces
//! `processedCSV/` with the filtered file.

use aws_config::BehaviorVersion;
use aws_lambda_events::event::s3::S3Event;
use csvpipe_core::decoder::parse_csv;
use csvpipe_core::egress::replace_output;
use csvpipe_core::ingress::object_from_s3_event;
use csvpipe_core::{HandlerResponse, ObjectStore, PipelineConfig, Result, S3Store};
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::Serialize;
use tracing::{error, info, warn};

const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Serialize)]
struct FilterOutcome {
    status: &'static str,
    rows_kept: usize,
    rows_dropped: usize,
}

struct HandlerDeps<S: ObjectStore> {
    store: S,
    config: PipelineConfig,
}

async fn process_event<S: ObjectStore>(deps: &HandlerDeps<S>, event: &S3Event) -> Result<FilterOutcome> {
    let source = object_from_s3_event(event)?;
    info!(bucket = %source.bucket, key = %source.key, "File detected");

    if source.key.starts_with(&deps.config.csv_output.prefix) {
        warn!(key = %source.key, "Ignoring event for our own output");
        return Ok(FilterOutcome {
            status: "Skipped",
            rows_kept: 0,
            rows_dropped: 0,
        });
    }

    let bytes = deps.store.get_object(&source.bucket, &source.key).await?;
    let table = parse_csv(&bytes, deps.config.delimiter)?;
    info!(columns = ?table.headers, rows = table.rows.len(), "Loaded CSV");

    let filtered = deps.config.metric_allow_list.filter(&table)?;
    let outcome = FilterOutcome {
        status: "Success",
        rows_kept: filtered.rows.len(),
        rows_dropped: table.rows.len() - filtered.rows.len(),
    };
    info!(
        rows_kept = outcome.rows_kept,
        rows_dropped = outcome.rows_dropped,
        "Filtered rows by metric_name"
    );

    replace_output(
        &deps.store,
        &source.bucket,
        &deps.config.csv_output,
        filtered.to_csv_bytes(deps.config.delimiter)?,
        CSV_CONTENT_TYPE,
    )
    .await?;

    Ok(outcome)
}

async fn handler<S: ObjectStore>(
    deps: &HandlerDeps<S>,
    event: LambdaEvent<S3Event>,
) -> std::result::Result<HandlerResponse, LambdaError> {
    let (payload, _context) = event.into_parts();

    info!(record_count = payload.records.len(), "Starting CSV processing");

    let response = match process_event(deps, &payload).await {
        Ok(outcome) => HandlerResponse::json(200, &outcome)?,
        Err(e) => {
            error!(error = %e, "CSV processing failed");
            HandlerResponse::from_error(&e)
        }
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> std::result::Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = PipelineConfig::from_env()?;
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let deps = HandlerDeps {
        store: S3Store::new(aws_sdk_s3::Client::new(&aws)),
        config,
    };

    run(service_fn(|event| handler(&deps, event))).await
}
