use crate::models::FileEntry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// The four operations tincan needs from a bucket.
///
/// Failures are returned as-is with context attached; nothing is retried.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Name of the bucket this service talks to.
    fn bucket(&self) -> &str;

    /// Streams the file at `local_path` to `key`, overwriting any existing object.
    async fn put(&self, local_path: &Path, key: &str) -> Result<()>;

    /// Streams `key` into `local_path`, creating or truncating the file.
    async fn get(&self, key: &str, local_path: &Path) -> Result<()>;

    /// Every object in the bucket from a single listing request.
    /// An empty bucket is an empty `Vec`.
    async fn list_all(&self) -> Result<Vec<FileEntry>>;

    /// Removes `key`. Removing a key that does not exist succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, local_path: &Path, key: &str) -> Result<()> {
        let body = ByteStream::from_path(local_path)
            .await
            .with_context(|| format!("unable to open file {:?}", local_path))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .with_context(|| format!("unable to upload {:?} to {:?}", local_path, self.bucket))?;

        debug!("PUT s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<()> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("unable to download {:?} from {:?}", key, self.bucket))?;

        let mut file = tokio::fs::File::create(local_path)
            .await
            .with_context(|| format!("unable to create file {:?}", local_path))?;

        let mut body = output.body.into_async_read();
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .with_context(|| format!("unable to write to file {:?}", local_path))?;
        file.flush()
            .await
            .with_context(|| format!("unable to write to file {:?}", local_path))?;

        debug!("GET s3://{}/{} ({} bytes)", self.bucket, key, written);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FileEntry>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .with_context(|| format!("unable to list objects in {:?}", self.bucket))?;

        if output.is_truncated().unwrap_or(false) {
            warn!(
                "Listing of {:?} was truncated; only the first page is shown",
                self.bucket
            );
        }

        let files = output
            .contents()
            .iter()
            .filter_map(|object| {
                let name = object.key()?.to_string();
                let last_modified = object.last_modified().and_then(|d| {
                    chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                });
                Some(FileEntry {
                    name,
                    size: object.size().unwrap_or(0),
                    last_modified,
                })
            })
            .collect();

        Ok(files)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("unable to delete {:?} from {:?}", key, self.bucket))?;

        debug!("DELETE s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
