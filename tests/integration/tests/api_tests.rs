//! Integration tests for the CSV pipeline API
//!
//! Run with: CSVPIPE_API_URL=https://your-api.execute-api.ap-southeast-2.amazonaws.com/dev cargo test
//!
//! These tests require a deployed single-tenant stage.

use csvpipe_integration_tests::{
    client::{ApiError, ErrorResponse},
    fixtures::{esg_csv, unique_file_name, ESG_HEADER},
    skip_if_no_api,
};
use pretty_assertions::assert_eq;

fn assert_status(err: ApiError, expected: u16) -> ErrorResponse {
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status.as_u16(), expected, "body: {}", body);
            serde_json::from_str(&body).expect("error body is JSON")
        }
        other => panic!("expected HTTP {}, got {}", expected, other),
    }
}

// ============================================================================
// Upload URL Tests
// ============================================================================

#[tokio::test]
async fn test_upload_url_with_default_bucket() {
    let client = skip_if_no_api!();
    let file = unique_file_name();

    let response = client
        .upload_url(Some(&file), None)
        .await
        .expect("Failed to get upload URL");

    assert_eq!(response.key, format!("rawCSV/{}", file));
    assert_eq!(response.expires_in, 3600);
    assert!(response.url.starts_with("https://"));
}

#[tokio::test]
async fn test_upload_url_missing_file_is_rejected() {
    let client = skip_if_no_api!();

    let err = client.upload_url(None, None).await.unwrap_err();

    let body = assert_status(err, 400);
    assert_eq!(body.error, "bad_request");
}

#[tokio::test]
async fn test_upload_url_foreign_bucket_is_forbidden() {
    let client = skip_if_no_api!();

    let err = client
        .upload_url(Some("data.csv"), Some("not-allowed"))
        .await
        .unwrap_err();

    let body = assert_status(err, 403);
    assert_eq!(body.error, "forbidden");
}

#[tokio::test]
async fn test_presigned_url_accepts_csv_put() {
    let client = skip_if_no_api!();
    let file = unique_file_name();

    let response = client
        .upload_url(Some(&file), None)
        .await
        .expect("Failed to get upload URL");

    client
        .put_presigned(&response.url, esg_csv(&["CO2DIRECTSCOPE1"]))
        .await
        .expect("Presigned PUT failed");
}

// ============================================================================
// CSV Upload Tests
// ============================================================================

#[tokio::test]
async fn test_post_csv_form_previews_rows() {
    let client = skip_if_no_api!();
    let metrics = ["CO2DIRECTSCOPE1", "WASTETOTAL", "UNKNOWN_METRIC"];

    let preview = client
        .post_csv_form("esg.csv", esg_csv(&metrics))
        .await
        .expect("Failed to post CSV");

    assert_eq!(preview.message, "CSV received");
    assert_eq!(preview.row_count, 3);
    assert_eq!(preview.columns.join(","), ESG_HEADER);
    assert!(preview.missing_columns.is_empty());
    assert_eq!(preview.rows[1][6], "WASTETOTAL");
}

#[tokio::test]
async fn test_post_csv_form_reports_missing_columns() {
    let client = skip_if_no_api!();

    let preview = client
        .post_csv_form("partial.csv", "company_name,metric_name\nAcme,WASTETOTAL\n".to_string())
        .await
        .expect("Failed to post CSV");

    assert_eq!(preview.row_count, 1);
    assert!(preview.missing_columns.contains(&"reported_date".to_string()));
    assert!(!preview.missing_columns.contains(&"metric_name".to_string()));
}
