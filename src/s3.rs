use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, instrument};

use crate::types::{Operation, SignedUrl, StoredObject};

/// Store capability consumed by the page render: signed-URL issuance
/// plus a single page of object listings. The bucket is fixed at
/// construction, so tests can substitute a fake store wholesale.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Derive a time-bounded URL authorizing exactly `operation` on `key`.
    /// Pure derivation from the signing credential; nothing is tracked
    /// after issuance. Errors propagate to the caller.
    async fn presign(
        &self,
        key: &str,
        operation: Operation,
        expires_in: Duration,
    ) -> Result<SignedUrl>;

    /// One store-defined page of objects under the bucket, in the
    /// store's default listing order.
    async fn list_objects(&self) -> Result<Vec<StoredObject>>;
}

/// S3 client wrapper for presigned URL and listing operations
pub struct S3Client {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    #[instrument(skip(self))]
    async fn presign(
        &self,
        key: &str,
        operation: Operation,
        expires_in: Duration,
    ) -> Result<SignedUrl> {
        info!(
            "Generating presigned {} URL for s3://{}/{} with duration {:?}",
            operation, self.bucket, key, expires_in
        );

        let presigning_config =
            PresigningConfig::expires_in(expires_in).context("Failed to create presigning config")?;

        let presigned_request = match operation {
            Operation::Get => {
                self.client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .presigned(presigning_config)
                    .await
                    .context("Failed to generate presigned GET URL")?
            }
            Operation::Put => {
                self.client
                    .put_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .presigned(presigning_config)
                    .await
                    .context("Failed to generate presigned PUT URL")?
            }
        };

        Ok(SignedUrl {
            url: presigned_request.uri().to_string(),
            expires_at: Utc::now() + expires_in,
        })
    }

    #[instrument(skip(self))]
    async fn list_objects(&self) -> Result<Vec<StoredObject>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .context("Failed to list bucket objects")?;

        let objects = response
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                let key = obj.key?;
                Some(StoredObject {
                    key,
                    size: obj.size.unwrap_or(0),
                    last_modified: obj.last_modified.and_then(to_chrono),
                })
            })
            .collect::<Vec<_>>();

        info!(
            "Listed {} objects in bucket {}",
            objects.len(),
            self.bucket
        );

        Ok(objects)
    }
}

fn to_chrono(dt: aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}
