//! Presigned upload URL issuance
//!
//! Containers are always checked against an allow-list. A single-tenant
//! deployment allows exactly its own bucket and uses it when the caller
//! omits one; a multi-tenant deployment requires the caller to name an
//! allowed bucket.

use std::time::Duration;

use tracing::info;

use crate::config::{UPLOAD_PREFIX, UPLOAD_URL_EXPIRY};
use crate::egress::clear_prefix;
use crate::errors::{Error, Result};
use crate::models::{ObjectRef, PresignedUpload};
use crate::storage::ObjectStore;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Which containers callers may upload into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    default_bucket: Option<String>,
    allowed_buckets: Vec<String>,
    prefix: String,
    expires_in: Duration,
}

impl UploadPolicy {
    pub fn single_tenant(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self {
            default_bucket: Some(bucket.clone()),
            allowed_buckets: vec![bucket],
            prefix: UPLOAD_PREFIX.to_string(),
            expires_in: UPLOAD_URL_EXPIRY,
        }
    }

    pub fn multi_tenant(allowed_buckets: Vec<String>) -> Self {
        Self {
            default_bucket: None,
            allowed_buckets,
            prefix: UPLOAD_PREFIX.to_string(),
            expires_in: UPLOAD_URL_EXPIRY,
        }
    }

    pub fn default_bucket(&self) -> Option<&str> {
        self.default_bucket.as_deref()
    }

    pub fn allows(&self, bucket: &str) -> bool {
        self.allowed_buckets.iter().any(|b| b == bucket)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Resolve request parameters to the object the URL will grant.
    ///
    /// Blank parameters count as absent.
    pub fn resolve(&self, bucket: Option<&str>, file: Option<&str>) -> Result<ObjectRef> {
        let file = file
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| Error::BadRequest("Missing 'file' parameter".to_string()))?;

        if file.contains('/') || file == "." || file == ".." {
            return Err(Error::BadRequest(format!("Invalid file name '{}'", file)));
        }

        let bucket = match bucket.map(str::trim).filter(|b| !b.is_empty()) {
            Some(bucket) => bucket,
            None => self
                .default_bucket()
                .ok_or_else(|| Error::BadRequest("Missing 'bucket' parameter".to_string()))?,
        };

        if !self.allows(bucket) {
            return Err(Error::Forbidden(format!("Bucket '{}' is not allowed", bucket)));
        }

        Ok(ObjectRef {
            bucket: bucket.to_string(),
            key: format!("{}{}", self.prefix, file),
        })
    }
}

/// Validate the request, clear the upload prefix and presign a CSV PUT.
///
/// Between the clear and the client's upload the prefix is empty.
pub async fn issue_upload_url<S>(
    store: &S,
    policy: &UploadPolicy,
    bucket: Option<&str>,
    file: Option<&str>,
) -> Result<PresignedUpload>
where
    S: ObjectStore + ?Sized,
{
    let target = policy.resolve(bucket, file)?;
    info!(bucket = %target.bucket, key = %target.key, "Issuing upload URL");

    clear_prefix(store, &target.bucket, policy.prefix()).await?;

    let url = store
        .presign_put(&target.bucket, &target.key, CSV_CONTENT_TYPE, policy.expires_in())
        .await?;

    Ok(PresignedUpload {
        url,
        bucket: target.bucket,
        key: target.key,
        expires_in: policy.expires_in().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockObjectStore;
    use mockall::predicate::eq;
    use tokio_test::block_on;

    #[test]
    fn test_single_tenant_defaults_bucket() {
        let policy = UploadPolicy::single_tenant("dev-bucket");
        let target = policy.resolve(None, Some("data.csv")).unwrap();
        assert_eq!(target.bucket, "dev-bucket");
        assert_eq!(target.key, "rawCSV/data.csv");
    }

    #[test]
    fn test_single_tenant_rejects_other_bucket() {
        let policy = UploadPolicy::single_tenant("dev-bucket");
        let result = policy.resolve(Some("not-allowed"), Some("data.csv"));
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_multi_tenant_requires_bucket() {
        let policy = UploadPolicy::multi_tenant(vec!["team-a".into()]);
        let result = policy.resolve(None, Some("data.csv"));
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_multi_tenant_forbidden_bucket() {
        let policy = UploadPolicy::multi_tenant(vec!["team-a".into()]);
        let result = policy.resolve(Some("not-allowed"), Some("data.csv"));
        let err = result.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_missing_file_wins_over_bad_bucket() {
        let policy = UploadPolicy::multi_tenant(vec!["team-a".into()]);
        for file in [None, Some(""), Some("   ")] {
            let err = policy.resolve(Some("not-allowed"), file).unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_path_like_file_names_rejected() {
        let policy = UploadPolicy::single_tenant("dev-bucket");
        for file in ["../secret.csv", "nested/data.csv", ".."] {
            assert!(matches!(
                policy.resolve(None, Some(file)),
                Err(Error::BadRequest(_))
            ));
        }
    }

    #[test]
    fn test_issue_clears_prefix_then_presigns() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_keys()
            .with(eq("dev-bucket"), eq("rawCSV/"))
            .times(1)
            .returning(|_, _| Ok(vec!["rawCSV/old.csv".to_string()]));
        store
            .expect_delete_object()
            .with(eq("dev-bucket"), eq("rawCSV/old.csv"))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_presign_put()
            .with(
                eq("dev-bucket"),
                eq("rawCSV/data.csv"),
                eq("text/csv"),
                eq(Duration::from_secs(3600)),
            )
            .times(1)
            .returning(|_, _, _, _| Ok("https://signed.example/put".to_string()));

        let policy = UploadPolicy::single_tenant("dev-bucket");
        let upload = block_on(issue_upload_url(&store, &policy, None, Some("data.csv"))).unwrap();

        assert_eq!(upload.url, "https://signed.example/put");
        assert_eq!(upload.key, "rawCSV/data.csv");
        assert_eq!(upload.expires_in, 3600);
    }

    #[test]
    fn test_rejected_request_touches_nothing() {
        let mut store = MockObjectStore::new();
        store.expect_list_keys().times(0);
        store.expect_presign_put().times(0);

        let policy = UploadPolicy::single_tenant("dev-bucket");
        let result = block_on(issue_upload_url(&store, &policy, Some("other"), Some("data.csv")));
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }
}
