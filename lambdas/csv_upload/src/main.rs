//! CSV Upload Lambda
//!
//! Handles POST /csv with either a multipart form carrying a CSV file or a
//! raw CSV body, optionally base64-encoded by API Gateway.
//!
//! Nothing is stored; the response previews what was received and which
//! required columns are missing.

use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use csvpipe_core::decoder::parse_csv;
use csvpipe_core::schema::missing_columns;
use csvpipe_core::{CsvPayload, CsvPreview, CsvTable, HandlerResponse, PipelineConfig, Result};
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use tracing::{error, info};

const PREVIEW_ROWS: usize = 5;

fn preview(table: &CsvTable, required: &[String]) -> CsvPreview {
    CsvPreview {
        message: "CSV received".to_string(),
        columns: table.headers.clone(),
        rows: table
            .rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| row.values().map(str::to_string).collect())
            .collect(),
        row_count: table.rows.len(),
        missing_columns: missing_columns(&table.headers, required),
    }
}

async fn process_upload(config: &PipelineConfig, request: &ApiGatewayProxyRequest) -> Result<CsvPreview> {
    let bytes = CsvPayload::from(request).into_csv_bytes().await?;
    let table = parse_csv(&bytes, config.delimiter)?;

    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Parsed uploaded CSV"
    );

    Ok(preview(&table, &config.required_columns))
}

async fn handler(
    config: &PipelineConfig,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> std::result::Result<HandlerResponse, LambdaError> {
    let (request, _context) = event.into_parts();

    info!(
        path = request.path.as_deref().unwrap_or_default(),
        base64 = request.is_base64_encoded,
        "Processing CSV upload"
    );

    let response = match process_upload(config, &request).await {
        Ok(preview) => HandlerResponse::json(200, &preview)?,
        Err(e) => {
            error!(error = %e, "CSV upload failed");
            HandlerResponse::from_error(&e)
        }
    };

    Ok(response.with_cors())
}

#[tokio::main]
async fn main() -> std::result::Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = PipelineConfig::from_env()?;

    run(service_fn(|event| handler(&config, event))).await
}
