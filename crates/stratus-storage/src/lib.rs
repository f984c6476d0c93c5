//! Stratus Storage Library
//!
//! This crate provides the blob storage abstraction and its backends: the
//! Storage trait, the Alibaba Cloud OSS adapter, and a local filesystem
//! implementation.
//!
//! # Storage key format
//!
//! Keys are opaque base36 tokens generated by `stratus_core::blob_key`. For
//! backends that cannot control the download filename of a served URL, the
//! sanitized filename rides along as a trailing key segment
//! (`{token}/{filename}`); the backends themselves never interpret it.
//!
//! Keys must not be empty, contain `..` segments, or start with `/`. Key
//! validation is centralized in the `keys` module so all backends stay
//! consistent.

pub mod checksum;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-oss")]
pub mod oss;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-oss")]
pub use oss::OssStorage;
pub use stratus_core::StorageBackend;
pub use traits::{PresignedUpload, Storage, StorageError, StorageResult, UrlOptions};
