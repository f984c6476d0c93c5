//! Stratus Core Library
//!
//! This crate provides the domain model shared across all Stratus components:
//! configuration, backend identifiers, filename and serving-disposition
//! handling, and blob key generation.

pub mod blob_key;
pub mod config;
pub mod disposition;
pub mod filename;
pub mod storage_types;

// Re-export commonly used types
pub use blob_key::generate_key;
pub use config::Config;
pub use disposition::{serving_disposition, Disposition};
pub use filename::{content_disposition_with, Filename};
pub use storage_types::StorageBackend;
