//! Error types for the CSV pipeline

use thiserror::Error;

/// Result type alias using the pipeline Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers for any server-side failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed request input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Container not in the configured allow-list
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// CSV header lacks required columns
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A data row lacks a field its header declares
    #[error("Row {row} is missing field '{field}'")]
    MissingField { row: usize, field: String },

    /// Base64, UTF-8 or multipart decoding failure
    #[error("Decode error: {0}")]
    Decode(String),

    /// CSV parse failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid environment configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Object store read/list/delete failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Object store write failure
    #[error("Write error: {0}")]
    Write(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "bad_request",
            Error::Forbidden(_) => "forbidden",
            Error::MissingColumns(_) => "schema_error",
            Error::MissingField { .. } => "schema_error",
            Error::Decode(_) => "decode_error",
            Error::Csv(_) => "decode_error",
            Error::Config(_) => "configuration_error",
            Error::Storage(_) => "storage_error",
            Error::Write(_) => "write_error",
            Error::Serialization(_) => "serialization_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::BadRequest(_) => 400,
            Error::Forbidden(_) => 403,
            Error::MissingColumns(_) => 400,
            Error::MissingField { .. } => 400,
            Error::Decode(_) => 400,
            Error::Csv(_) => 400,
            Error::Config(_) => 500,
            Error::Storage(_) => 500,
            Error::Write(_) => 500,
            Error::Serialization(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Server-side failures collapse to a generic message; their detail is
    /// only ever logged.
    pub fn public_message(&self) -> String {
        if self.status_code() >= 500 {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Structured details attached to the error body, if any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::MissingColumns(missing) => Some(serde_json::json!({ "missing": missing })),
            Error::MissingField { row, field } => {
                Some(serde_json::json!({ "row": row, "field": field }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::Forbidden("other-bucket".into());
        assert_eq!(err.code(), "forbidden");
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_error_display() {
        let err = Error::MissingColumns(vec!["pillar".into(), "perm_id".into()]);
        assert_eq!(err.to_string(), "Missing columns: pillar, perm_id");
    }

    #[test]
    fn test_server_errors_hide_internals() {
        let err = Error::Write("AccessDenied: arn:aws:s3:::secret".into());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = Error::BadRequest("Missing 'file' parameter".into());
        assert_eq!(err.public_message(), "Bad request: Missing 'file' parameter");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_missing_columns_details() {
        let err = Error::MissingColumns(vec!["pillar".into()]);
        assert_eq!(
            err.details(),
            Some(serde_json::json!({ "missing": ["pillar"] }))
        );
    }
}
