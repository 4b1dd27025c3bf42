//! CSV pipeline API client for testing

use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

/// API client for the pipeline's HTTP endpoints
pub struct CsvPipeClient {
    client: Client,
    base_url: String,
}

// Response types

#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrlResponse {
    #[serde(rename = "URL")]
    pub url: String,
    pub bucket: String,
    pub key: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvPreview {
    pub message: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Result type for API responses
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// HTTP error with status code and body
    Http { status: StatusCode, body: String },
    /// Network or serialization error
    Request(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl CsvPipeClient {
    /// Create a new client with the given base URL
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request a presigned upload URL
    pub async fn upload_url(
        &self,
        file: Option<&str>,
        bucket: Option<&str>,
    ) -> ApiResult<UploadUrlResponse> {
        let mut query = Vec::new();
        if let Some(file) = file {
            query.push(("file", file));
        }
        if let Some(bucket) = bucket {
            query.push(("bucket", bucket));
        }

        let response = self
            .client
            .get(format!("{}/upload-url", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    /// PUT a CSV body to a presigned URL
    pub async fn put_presigned(&self, url: &str, csv: String) -> ApiResult<()> {
        let response = self
            .client
            .put(url)
            .header("Content-Type", "text/csv")
            .body(csv)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Http { status, body })
        }
    }

    /// POST a CSV file as multipart form data
    pub async fn post_csv_form(&self, file_name: &str, csv: String) -> ApiResult<CsvPreview> {
        let part = multipart::Part::text(csv)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/csv", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::Request(e.to_string()))
        } else {
            Err(ApiError::Http { status, body })
        }
    }
}
