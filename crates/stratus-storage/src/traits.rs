//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use std::collections::HashMap;
use std::ops::Range;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use stratus_core::{Disposition, Filename, StorageBackend};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Integrity check failed for {key}: expected checksum {expected}, got {actual}")]
    IntegrityCheckFailed {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Options for generating a service URL.
///
/// Disposition, filename and content type only take effect on backends that
/// can control serving headers; the OSS backend carries the filename in the
/// key layout instead.
#[derive(Debug, Clone)]
pub struct UrlOptions {
    /// How long a presigned URL stays valid. Ignored for public URLs.
    pub expires_in: Duration,
    pub disposition: Disposition,
    pub filename: Option<Filename>,
    pub content_type: Option<String>,
}

impl Default for UrlOptions {
    fn default() -> Self {
        UrlOptions {
            expires_in: Duration::from_secs(300),
            disposition: Disposition::Inline,
            filename: None,
            content_type: None,
        }
    }
}

/// A presigned direct-upload request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PresignedUpload {
    /// URL the client PUTs the file to.
    pub url: String,
    /// HTTP method to use.
    pub method: String,
    /// Headers the client must send with the request.
    pub headers: HashMap<String, String>,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// All storage backends (OSS, local filesystem) must implement this trait.
/// Callers work against `Arc<dyn Storage>` without coupling to a provider.
///
/// **Key format:** opaque tokens from `stratus_core::blob_key`; see the
/// crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` at `key`.
    ///
    /// When `checksum` (base64-encoded MD5 of the payload) is supplied and
    /// does not match, the upload fails with `IntegrityCheckFailed` and no
    /// object is left behind.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
        checksum: Option<&str>,
    ) -> StorageResult<()>;

    /// Store the contents of `reader` at `key` (for large files).
    ///
    /// `content_length` is a hint; the reader is consumed until EOF.
    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<()>;

    /// Download the full object at `key`.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Download the object at `key` as a stream of `Bytes` chunks.
    async fn download_stream(
        &self,
        key: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>>;

    /// Download the byte range `range` of the object at `key`.
    ///
    /// A range reaching past the end of the object returns the available
    /// prefix rather than an error.
    async fn download_range(&self, key: &str, range: Range<u64>) -> StorageResult<Vec<u8>>;

    /// Delete the object at `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Delete every object whose key starts with `prefix`.
    async fn delete_prefixed(&self, prefix: &str) -> StorageResult<()>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Size in bytes of the object at `key`.
    async fn content_length(&self, key: &str) -> StorageResult<u64>;

    /// Generate a URL for downloading the object at `key`.
    ///
    /// Public backends return a plain public URL; private ones a presigned
    /// GET URL honoring `opts.expires_in`.
    async fn url(&self, key: &str, opts: &UrlOptions) -> StorageResult<String>;

    /// Generate a presigned PUT URL for direct uploads.
    ///
    /// `checksum` (base64 MD5), when given, becomes a `Content-MD5` header
    /// the client must send.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        checksum: Option<&str>,
        expires_in: Duration,
    ) -> StorageResult<PresignedUpload>;

    /// Whether this backend can set the serving disposition (and thereby the
    /// download filename) of a generated URL. Backends answering `false` get
    /// filename-suffixed keys from `blob_key::generate_key`.
    fn supports_serving_disposition(&self) -> bool;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
