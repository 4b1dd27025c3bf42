//! Domain models for the CSV pipeline
//!
//! These types represent the data that moves through one invocation:
//! - Rows and tables: decoded CSV content keyed by header name
//! - Event logs: the normalized JSON document written by the converter
//! - Responses: the JSON bodies handlers return to API Gateway or S3 triggers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One decoded CSV line, keyed by header name in column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value of the first field with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Field values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A decoded CSV file: header names plus rows zipped against them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Location of an object in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Fixed output location: every run replaces whatever lives under `prefix`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub prefix: String,
    pub file_name: String,
}

impl Destination {
    pub fn new(prefix: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            file_name: file_name.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}{}", self.prefix, self.file_name)
    }
}

/// Batch-level time metadata on the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTime {
    pub timestamp: String,
    pub timezone: String,
}

/// Per-event time metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTime {
    /// Copied verbatim from the row's `reported_date`
    pub timestamp: String,
    pub duration: u32,
    pub duration_unit: String,
    pub timezone: String,
}

/// The 14 non-timestamp schema fields, carried as strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub company_name: String,
    pub perm_id: String,
    pub data_type: String,
    pub disclosure: String,
    pub metric_description: String,
    pub metric_name: String,
    pub metric_unit: String,
    pub metric_value: String,
    pub metric_year: String,
    pub nb_points_of_observations: String,
    pub metric_period: String,
    pub provider_name: String,
    pub pillar: String,
    pub headquarter_country: String,
}

/// One normalized row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time_object: EventTime,
    pub event_type: String,
    pub attribute: Attribute,
}

/// The JSON document written by the CSV-to-JSON converter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub data_source: String,
    pub dataset_type: String,
    pub dataset_id: String,
    pub time_object: LogTime,
    pub events: Vec<Event>,
}

/// Result of issuing a presigned upload URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedUpload {
    #[serde(rename = "URL")]
    pub url: String,
    pub bucket: String,
    pub key: String,
    pub expires_in: u64,
}

/// Summary returned after a CSV upload is decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvPreview {
    pub message: String,
    pub columns: Vec<String>,
    /// First few data rows, as raw values
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub missing_columns: Vec<String>,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&crate::Error> for ErrorResponse {
    fn from(err: &crate::Error) -> Self {
        let response = ErrorResponse::new(err.code(), err.public_message());
        match err.details() {
            Some(details) => response.with_details(details),
            None => response,
        }
    }
}

/// Proxy-integration style response: `{statusCode, headers?, body}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded body
    pub body: String,
}

impl HandlerResponse {
    /// JSON response with the given status
    pub fn json<T: Serialize>(status_code: u16, body: &T) -> crate::Result<Self> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Ok(Self {
            status_code,
            headers,
            body: serde_json::to_string(body)?,
        })
    }

    /// Error response carrying the mapped status and a safe message
    pub fn from_error(err: &crate::Error) -> Self {
        let body = serde_json::to_string(&ErrorResponse::from(err))
            .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, err.code()));
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: err.status_code(),
            headers,
            body,
        }
    }

    /// Attach browser CORS headers
    pub fn with_cors(mut self) -> Self {
        for (name, value) in crate::CORS_HEADERS {
            self.headers.insert(name.to_string(), value.to_string());
        }
        self
    }
}
