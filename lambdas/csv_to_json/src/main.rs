//! CSV to JSON Lambda
//!
//! Triggered by S3 when a raw CSV lands. Validates the columns, converts
//! every row into an ESG event and replaces `processedJSON/` with the new
//! event log.

use aws_config::BehaviorVersion;
use aws_lambda_events::event::s3::S3Event;
use chrono::Utc;
use csvpipe_core::decoder::parse_csv;
use csvpipe_core::egress::replace_output;
use csvpipe_core::ingress::object_from_s3_event;
use csvpipe_core::schema::validate_columns;
use csvpipe_core::{EventLog, HandlerResponse, ObjectRef, ObjectStore, PipelineConfig, Result, S3Store};
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::Serialize;
use tracing::{error, info, warn};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ConversionOutcome {
    Converted { status: &'static str, events_added: usize },
    Skipped { status: &'static str, reason: String },
}

struct HandlerDeps<S: ObjectStore> {
    store: S,
    config: PipelineConfig,
}

/// Convert one uploaded CSV; nothing is written unless every row converts
async fn convert_object<S: ObjectStore>(deps: &HandlerDeps<S>, source: &ObjectRef) -> Result<usize> {
    info!(bucket = %source.bucket, key = %source.key, "Downloading file");
    let bytes = deps.store.get_object(&source.bucket, &source.key).await?;

    let table = parse_csv(&bytes, deps.config.delimiter)?;
    validate_columns(&table.headers, &deps.config.required_columns[..])?;
    info!(rows = table.rows.len(), "All expected columns are present");

    let log = EventLog::from_table(&table, &deps.config.event_log, Utc::now())?;
    let events_added = log.events.len();

    replace_output(
        &deps.store,
        &source.bucket,
        &deps.config.json_output,
        log.to_json_bytes()?,
        JSON_CONTENT_TYPE,
    )
    .await?;

    Ok(events_added)
}

async fn process_event<S: ObjectStore>(deps: &HandlerDeps<S>, event: &S3Event) -> Result<ConversionOutcome> {
    let source = object_from_s3_event(event)?;

    if source.key.starts_with(&deps.config.json_output.prefix) {
        warn!(key = %source.key, "Ignoring event for our own output");
        return Ok(ConversionOutcome::Skipped {
            status: "Skipped",
            reason: format!("{} is a processed output", source.key),
        });
    }

    let events_added = convert_object(deps, &source).await?;
    info!(events_added, "Conversion of CSV to JSON completed");

    Ok(ConversionOutcome::Converted {
        status: "Success",
        events_added,
    })
}

async fn handler<S: ObjectStore>(
    deps: &HandlerDeps<S>,
    event: LambdaEvent<S3Event>,
) -> std::result::Result<HandlerResponse, LambdaError> {
    let (payload, _context) = event.into_parts();

    info!(
        record_count = payload.records.len(),
        destination = %deps.config.json_output.key(),
        "Starting conversion of CSV to JSON"
    );

    let response = match process_event(deps, &payload).await {
        Ok(outcome) => HandlerResponse::json(200, &outcome)?,
        Err(e) => {
            error!(error = %e, "CSV to JSON conversion failed");
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
