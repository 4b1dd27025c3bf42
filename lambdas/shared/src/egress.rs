//! Output replacement: at most one processed artifact per prefix
//!
//! The list, delete and put calls are separate requests. Two invocations
//! racing on the same prefix can interleave and leave the prefix empty or
//! holding the other run's output; S3 offers no conditional replace across
//! keys, so this window is accepted.

use tracing::info;

use crate::errors::Result;
use crate::models::{Destination, ObjectRef};
use crate::storage::ObjectStore;

/// Delete every object under `prefix`, returning how many were removed
pub async fn clear_prefix<S>(store: &S, bucket: &str, prefix: &str) -> Result<usize>
where
    S: ObjectStore + ?Sized,
{
    let keys = store.list_keys(bucket, prefix).await?;
    if keys.is_empty() {
        info!(bucket = %bucket, prefix = %prefix, "No previous files found");
        return Ok(0);
    }

    for key in &keys {
        info!(bucket = %bucket, key = %key, "Deleting existing file");
        store.delete_object(bucket, key).await?;
    }

    Ok(keys.len())
}

/// Clear the destination prefix, then write `body` at the destination key
pub async fn replace_output<S>(
    store: &S,
    bucket: &str,
    destination: &Destination,
    body: Vec<u8>,
    content_type: &str,
) -> Result<ObjectRef>
where
    S: ObjectStore + ?Sized,
{
    clear_prefix(store, bucket, &destination.prefix).await?;

    let key = destination.key();
    info!(bucket = %bucket, key = %key, bytes = body.len(), "Uploading output");
    store.put_object(bucket, &key, body, content_type).await?;

    Ok(ObjectRef {
        bucket: bucket.to_string(),
        key,
    })
}
