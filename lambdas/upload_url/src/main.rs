//! Upload URL Lambda
//!
//! Handles GET /upload-url?file={name}[&bucket={bucket}]
//!
//! Returns a presigned PUT URL for `rawCSV/{name}` after clearing any
//! previous raw upload.

use aws_config::BehaviorVersion;
use csvpipe_core::presign::issue_upload_url;
use csvpipe_core::{HandlerResponse, ObjectStore, PipelineConfig, S3Store, UploadPolicy};
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use tracing::{error, info};

struct HandlerDeps<S: ObjectStore> {
    store: S,
    policy: UploadPolicy,
}

async fn handler<S: ObjectStore>(
    deps: &HandlerDeps<S>,
    event: Request,
) -> Result<Response<Body>, LambdaError> {
    let params = event.query_string_parameters();
    let bucket = params.first("bucket");
    let file = params.first("file");

    info!(bucket = ?bucket, file = ?file, "Processing upload URL request");

    let response = match issue_upload_url(&deps.store, &deps.policy, bucket, file).await {
        Ok(upload) => {
            info!(bucket = %upload.bucket, key = %upload.key, "Generated presigned URL");
            HandlerResponse::json(200, &upload)?
        }
        Err(e) => {
            error!(error = %e, "Upload URL request failed");
            HandlerResponse::from_error(&e)
        }
    };

    into_http(response.with_cors())
}

fn into_http(response: HandlerResponse) -> Result<Response<Body>, LambdaError> {
    let mut builder = Response::builder().status(response.status_code);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    Ok(builder.body(Body::from(response.body))?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = PipelineConfig::from_env()?;
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let deps = HandlerDeps {
        store: S3Store::new(aws_sdk_s3::Client::new(&aws)),
        policy: config.upload,
    };

    run(service_fn(|event| handler(&deps, event))).await
}
