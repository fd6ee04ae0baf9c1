use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors that can occur when storing a profile photo
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file type not allowed")]
    UnsupportedMediaType,

    #[error("storage operation timed out")]
    Timeout,

    #[error("storage error: {0}")]
    Backend(String),
}

/// Object storage for user-uploaded profile photos.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an image and return its public URL.
    async fn put_photo(&self, data: Vec<u8>, content_type: &str)
        -> Result<String, StorageError>;
}

/// S3-compatible object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
    op_timeout: Duration,
}

impl S3ObjectStore {
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: String,
        public_url: String,
        op_timeout: Duration,
    ) -> Self {
        Self {
            client,
            bucket,
            public_url,
            op_timeout,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_photo(
        &self,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let ext = extension_for(content_type).ok_or(StorageError::UnsupportedMediaType)?;
        if !looks_like_image(&data) {
            return Err(StorageError::UnsupportedMediaType);
        }

        let key = format!("photos/{}.{}", Uuid::new_v4(), ext);

        let upload = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send();

        match tokio::time::timeout(self.op_timeout, upload).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(StorageError::Backend(e.to_string())),
            Err(_) => return Err(StorageError::Timeout),
        }

        info!("uploaded photo to s3://{}/{}", self.bucket, key);

        Ok(format!(
            "{}/{}/{}",
            self.public_url.trim_end_matches('/'),
            self.bucket,
            key
        ))
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpeg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Cheap magic-byte sniff: JPEG SOI marker or a RIFF/WEBP container.
fn looks_like_image(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8, 0xFF])
        || (data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP")
}
