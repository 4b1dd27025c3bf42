//! Adapters from Lambda trigger payloads to pipeline inputs

use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use aws_lambda_events::event::s3::S3Event;

use crate::decoder::CsvPayload;
use crate::errors::{Error, Result};
use crate::models::ObjectRef;

/// Bucket and key of the object that fired an S3 notification.
///
/// Notification keys arrive form-encoded (`+` for space, `%XX` escapes).
pub fn object_from_s3_event(event: &S3Event) -> Result<ObjectRef> {
    let record = event
        .records
        .first()
        .ok_or_else(|| Error::BadRequest("S3 event has no records".to_string()))?;

    let bucket = record
        .s3
        .bucket
        .name
        .as_deref()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| Error::BadRequest("S3 event is missing the bucket name".to_string()))?;

    let raw_key = record
        .s3
        .object
        .key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::BadRequest("S3 event is missing the object key".to_string()))?;

    let key = percent_encoding::percent_decode_str(&raw_key.replace('+', " "))
        .decode_utf8()
        .map_err(|e| Error::Decode(format!("object key is not valid UTF-8: {}", e)))?
        .to_string();

    Ok(ObjectRef {
        bucket: bucket.to_string(),
        key,
    })
}

impl From<&ApiGatewayProxyRequest> for CsvPayload {
    fn from(request: &ApiGatewayProxyRequest) -> Self {
        // HeaderMap lookups are case-insensitive
        let content_type = request
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            body: request.body.clone(),
            is_base64: request.is_base64_encoded,
            content_type,
        }
    }
}
