//! CSV pipeline core library
//!
//! Shared functionality for the pipeline's Lambda functions including:
//! - Payload decoding (base64, multipart, delimited text)
//! - Schema validation and event-log normalization
//! - Metric allow-list filtering
//! - Presigned upload issuance and output replacement
//! - Object store access, configuration and error types

pub mod config;
pub mod decoder;
pub mod egress;
pub mod errors;
pub mod filter;
pub mod ingress;
pub mod models;
pub mod normalizer;
pub mod presign;
pub mod schema;
pub mod storage;

pub use config::{Delimiter, EventLogSettings, PipelineConfig, CORS_HEADERS};
pub use decoder::CsvPayload;
pub use errors::{Error, Result};
pub use filter::MetricAllowList;
pub use models::*;
pub use presign::UploadPolicy;
pub use storage::{ObjectStore, S3Store};

#[cfg(any(test, feature = "mocks"))]
pub use storage::MockObjectStore;
