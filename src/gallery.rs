use anyhow::Result;
use futures::future::try_join_all;
use std::time::Duration;
use tracing::{error, info};

use crate::s3::ObjectStore;
use crate::types::{GalleryEntry, Operation, StoredObject};

/// Key suffixes treated as images, matched case-insensitively
const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Gallery window: at most this many entries per render
pub const MAX_ENTRIES: usize = 20;

/// Whether a key looks like an image by suffix
pub fn is_image_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// List the bucket, keep the first `MAX_ENTRIES` image-suffixed keys in
/// the store-returned order, and attach a fresh get-capable signed URL
/// to each. Signing runs concurrently and joins all-or-nothing: one
/// failed signing request drops the whole batch.
///
/// Never fails the render. A listing failure, or any signing failure,
/// degrades to an empty gallery with the error logged.
pub async fn recent_images(store: &dyn ObjectStore, url_expiry: Duration) -> Vec<GalleryEntry> {
    let objects = match store.list_objects().await {
        Ok(objects) => objects,
        Err(e) => {
            error!("Error listing images: {:#}", e);
            return Vec::new();
        }
    };

    let retained: Vec<StoredObject> = objects
        .into_iter()
        .filter(|obj| is_image_key(&obj.key))
        .take(MAX_ENTRIES)
        .collect();

    match sign_entries(store, retained, url_expiry).await {
        Ok(entries) => {
            info!("Prepared {} gallery entries", entries.len());
            entries
        }
        Err(e) => {
            error!("Error signing gallery URLs: {:#}", e);
            Vec::new()
        }
    }
}

async fn sign_entries(
    store: &dyn ObjectStore,
    objects: Vec<StoredObject>,
    url_expiry: Duration,
) -> Result<Vec<GalleryEntry>> {
    try_join_all(objects.into_iter().map(|obj| async move {
        let signed = store.presign(&obj.key, Operation::Get, url_expiry).await?;
        Ok::<_, anyhow::Error>(GalleryEntry {
            key: obj.key,
            url: signed.url,
            size: obj.size,
            last_modified: obj.last_modified,
        })
    }))
    .await
}
