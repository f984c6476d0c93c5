use std::collections::HashMap;
use std::ops::Range;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use futures::StreamExt;
use opendal::{services, ErrorKind, Operator};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::checksum;
use crate::keys;
use crate::traits::{PresignedUpload, Storage, StorageError, StorageResult, UrlOptions};
use crate::StorageBackend;

/// Escape set for object keys in public URLs: everything outside
/// unreserved characters, except the `/` separating key segments.
const KEY_PATH_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Alibaba Cloud OSS storage implementation
///
/// A single `Operator` is built at construction and shared by every
/// operation. OSS cannot attach a `Content-Disposition` to public or
/// presigned URLs, so `supports_serving_disposition` answers `false` and
/// download filenames are carried by the key layout instead.
#[derive(Clone)]
pub struct OssStorage {
    op: Operator,
    bucket: String,
    endpoint: String,
    public: bool,
}

impl OssStorage {
    /// Create a new OssStorage instance
    ///
    /// # Arguments
    /// * `bucket` - OSS bucket name
    /// * `endpoint` - Region endpoint (e.g., "https://oss-cn-hangzhou.aliyuncs.com")
    /// * `access_key_id` / `access_key_secret` - RAM credentials
    /// * `public` - Whether bucket objects are world-readable
    pub fn new(
        bucket: String,
        endpoint: String,
        access_key_id: String,
        access_key_secret: String,
        public: bool,
    ) -> StorageResult<Self> {
        let builder = services::Oss::default()
            .bucket(&bucket)
            .endpoint(&endpoint)
            .access_key_id(&access_key_id)
            .access_key_secret(&access_key_secret);

        let op = Operator::new(builder)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?
            .finish();

        Ok(OssStorage {
            op,
            bucket,
            endpoint,
            public,
        })
    }

    /// Public URL for an object: `{scheme}://{bucket}.{endpoint-host}/{key}`
    fn public_url(&self, key: &str) -> String {
        let (scheme, host) = match self.endpoint.split_once("://") {
            Some((scheme, host)) => (scheme, host),
            None => ("https", self.endpoint.as_str()),
        };
        format!(
            "{}://{}.{}/{}",
            scheme,
            self.bucket,
            host.trim_end_matches('/'),
            utf8_percent_encode(key, KEY_PATH_ESCAPE)
        )
    }
}

#[async_trait]
impl Storage for OssStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
        checksum: Option<&str>,
    ) -> StorageResult<()> {
        keys::validate(key)?;

        // Verified before the write so a mismatch never stores anything.
        if let Some(expected) = checksum {
            checksum::verify(key, &data, expected)?;
        }

        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result = self.op.write_with(key, data).content_type(content_type).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "OSS upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OSS upload successful"
        );

        Ok(())
    }

    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<()> {
        keys::validate(key)?;
        let start = std::time::Instant::now();

        let mut writer = self
            .op
            .writer_with(key)
            .content_type(content_type)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let mut size: u64 = 0;
        let mut buf = vec![0u8; 8192];
        loop {
            let bytes_read = reader.read(&mut buf).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
            })?;
            if bytes_read == 0 {
                break;
            }
            size += bytes_read as u64;
            writer
                .write(Bytes::copy_from_slice(&buf[..bytes_read]))
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %key,
                        size_bytes = size,
                        "OSS stream upload failed"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;
        }

        writer
            .close()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OSS stream upload successful"
        );

        Ok(())
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        keys::validate(key)?;
        let start = std::time::Instant::now();

        let result = self.op.read(key).await;

        let buffer = result.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "OSS download failed"
                );
                StorageError::DownloadFailed(e.to_string())
            }
        })?;

        let data = buffer.to_vec();

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = data.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OSS download successful"
        );

        Ok(data)
    }

    async fn download_stream(
        &self,
        key: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>> {
        keys::validate(key)?;
        let start = std::time::Instant::now();

        let meta = self.op.stat(key).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::DownloadFailed(e.to_string()),
        })?;

        let reader = self
            .op
            .reader(key)
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let stream = reader
            .into_bytes_stream(0..meta.content_length())
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let bucket = self.bucket.clone();
        let key = key.to_string();

        let stream = stream.map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "OSS stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }

    async fn download_range(&self, key: &str, range: Range<u64>) -> StorageResult<Vec<u8>> {
        keys::validate(key)?;

        let result = self.op.read_with(key).range(range).await;

        let buffer = result.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::DownloadFailed(e.to_string()),
        })?;

        Ok(buffer.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        keys::validate(key)?;
        let start = std::time::Instant::now();

        let result = self.op.delete(key).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "OSS delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OSS delete successful"
        );

        Ok(())
    }

    async fn delete_prefixed(&self, prefix: &str) -> StorageResult<()> {
        keys::validate(prefix)?;
        let start = std::time::Instant::now();

        let result = self.op.remove_all(prefix).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                prefix = %prefix,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "OSS prefixed delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OSS prefixed delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        keys::validate(key)?;
        match self.op.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        keys::validate(key)?;
        let meta = self.op.stat(key).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::BackendError(e.to_string()),
        })?;
        Ok(meta.content_length())
    }

    async fn url(&self, key: &str, opts: &UrlOptions) -> StorageResult<String> {
        keys::validate(key)?;

        // OSS URLs cannot carry a serving disposition; for attachment blobs
        // the filename already rides in the key layout.
        if self.public {
            return Ok(self.public_url(key));
        }

        let presigned = self
            .op
            .presign_read(key, opts.expires_in)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Unsupported => StorageError::Unsupported("presigned URL"),
                _ => StorageError::BackendError(e.to_string()),
            })?;

        Ok(presigned.uri().to_string())
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        checksum: Option<&str>,
        expires_in: Duration,
    ) -> StorageResult<PresignedUpload> {
        keys::validate(key)?;

        let presigned = self
            .op
            .presign_write(key, expires_in)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Unsupported => StorageError::Unsupported("presigned upload"),
                _ => StorageError::BackendError(e.to_string()),
            })?;

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        if let Some(checksum) = checksum {
            headers.insert("Content-MD5".to_string(), checksum.to_string());
        }

        Ok(PresignedUpload {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            headers,
            expires_at: Utc::now()
                + chrono::Duration::seconds(i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX)),
        })
    }

    fn supports_serving_disposition(&self) -> bool {
        false
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Oss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(public: bool) -> OssStorage {
        OssStorage::new(
            "attachments".to_string(),
            "https://oss-cn-hangzhou.aliyuncs.com".to_string(),
            "test-key-id".to_string(),
            "test-key-secret".to_string(),
            public,
        )
        .unwrap()
    }

    #[test]
    fn public_url_format() {
        let storage = storage(true);
        assert_eq!(
            storage.public_url("0mgut9l2mkd0zachp8wvzi1jr"),
            "https://attachments.oss-cn-hangzhou.aliyuncs.com/0mgut9l2mkd0zachp8wvzi1jr"
        );
    }

    #[test]
    fn public_url_escapes_filename_segment() {
        let storage = storage(true);
        assert_eq!(
            storage.public_url("tok/annual report.pdf"),
            "https://attachments.oss-cn-hangzhou.aliyuncs.com/tok/annual%20report.pdf"
        );
    }

    #[test]
    fn public_url_without_scheme_defaults_to_https() {
        let storage = OssStorage::new(
            "attachments".to_string(),
            "oss-cn-shanghai.aliyuncs.com".to_string(),
            "id".to_string(),
            "secret".to_string(),
            true,
        )
        .unwrap();
        assert_eq!(
            storage.public_url("k"),
            "https://attachments.oss-cn-shanghai.aliyuncs.com/k"
        );
    }

    #[tokio::test]
    async fn url_rejects_invalid_key() {
        let storage = storage(true);
        let result = storage.url("../escape", &UrlOptions::default()).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn upload_checksum_mismatch_fails_before_write() {
        let storage = storage(false);
        // Verification happens before any request is made, so dummy
        // credentials never come into play.
        let result = storage
            .upload(
                "tok/file.bin",
                "application/octet-stream",
                b"data".to_vec(),
                Some("bogus=="),
            )
            .await;
        assert!(matches!(
            result,
            Err(StorageError::IntegrityCheckFailed { .. })
        ));
    }

    #[test]
    fn capabilities() {
        let storage = storage(false);
        assert!(!storage.supports_serving_disposition());
        assert_eq!(storage.backend_type(), StorageBackend::Oss);
    }
}
