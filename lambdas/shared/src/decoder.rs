//! Payload decoding: base64 bodies, multipart forms and delimited text
//!
//! Decoding always runs in the same order: base64 (if flagged), multipart
//! extraction (if the content type says so), UTF-8, then CSV parsing.

use std::convert::Infallible;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use tracing::debug;

use crate::config::Delimiter;
use crate::errors::{Error, Result};
use crate::models::{CsvTable, Row};

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const FILE_FIELD: &str = "file";

/// Raw request body plus the metadata needed to decode it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvPayload {
    pub body: Option<String>,
    pub is_base64: bool,
    pub content_type: Option<String>,
}

impl CsvPayload {
    /// Decode the payload down to the CSV bytes it carries
    pub async fn into_csv_bytes(self) -> Result<Vec<u8>> {
        let body = self
            .body
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::BadRequest("No file uploaded".to_string()))?;
        let bytes = decode_body(body, self.is_base64)?;

        let content_type = match self.content_type {
            Some(content_type) => content_type,
            None => return Ok(bytes),
        };

        let media = media_type(&content_type);
        if media == MULTIPART_FORM_DATA {
            // the boundary lives in the parameters, so pass the full header
            extract_csv_part(bytes, &content_type).await
        } else if is_csv_media_type(&media) || media == "text/plain" {
            Ok(bytes)
        } else {
            Err(Error::Decode(format!("unsupported content-type '{}'", media)))
        }
    }
}

/// Undo API Gateway's base64 wrapping when flagged
pub fn decode_body(body: String, is_base64: bool) -> Result<Vec<u8>> {
    if is_base64 {
        STANDARD
            .decode(body.trim())
            .map_err(|e| Error::Decode(format!("invalid base64 body: {}", e)))
    } else {
        Ok(body.into_bytes())
    }
}

/// Pull the CSV file out of a multipart/form-data body.
///
/// The first part, in document order, that either has a CSV content type
/// or is named `file` wins.
pub async fn extract_csv_part(body: Vec<u8>, content_type: &str) -> Result<Vec<u8>> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| Error::Decode(format!("invalid multipart content-type: {}", e)))?;

    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Decode(format!("malformed multipart body: {}", e)))?
    {
        let is_csv = field
            .content_type()
            .map(|mime| is_csv_media_type(mime.essence_str()))
            .unwrap_or(false);
        let is_file_field = field.name() == Some(FILE_FIELD);

        if is_csv || is_file_field {
            debug!(
                field = field.name().unwrap_or_default(),
                file_name = field.file_name().unwrap_or_default(),
                "Found CSV part"
            );
            let data = field
                .bytes()
                .await
                .map_err(|e| Error::Decode(format!("unreadable multipart part: {}", e)))?;
            return Ok(data.to_vec());
        }
    }

    Err(Error::Decode("no CSV file found".to_string()))
}

/// Parse delimited text into a header plus rows zipped against it.
///
/// Short rows keep only the fields they have. A row with more values than
/// the header has columns is a decode error naming its 1-based data row.
pub fn parse_csv(bytes: &[u8], delimiter: Delimiter) -> Result<CsvTable> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Decode(format!("body is not valid UTF-8: {}", e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(Error::Decode(format!(
                "row {} has {} values but the header has {} columns",
                index + 1,
                record.len(),
                headers.len()
            )));
        }
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        rows.push(Row::new(fields));
    }

    Ok(CsvTable { headers, rows })
}

/// Lower-cased media type without parameters
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_csv_media_type(media: &str) -> bool {
    matches!(
        media.to_ascii_lowercase().as_str(),
        "text/csv" | "application/csv" | "application/vnd.ms-excel"
    )
}
