use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::s3::ObjectStore;
use crate::types::{Operation, UploadTicket};

/// Prepare the upload endpoint for one page render: mint a fresh random
/// key and request a put-capable signed URL for it. The key becomes the
/// future object's identity; the object itself begins to exist only
/// when the client completes the PUT against the returned URL.
pub async fn prepare_upload(
    store: &dyn ObjectStore,
    expires_in: Duration,
) -> Result<UploadTicket> {
    let key = Uuid::new_v4().to_string();

    let signed = store
        .presign(&key, Operation::Put, expires_in)
        .await
        .context("Failed to sign upload URL")?;

    info!("Prepared upload ticket for key {}", key);

    Ok(UploadTicket {
        key,
        url: signed.url,
        expires_at: signed.expires_at,
    })
}
