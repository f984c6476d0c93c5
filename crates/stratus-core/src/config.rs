//! Configuration module
//!
//! Configuration is read from the process environment. Binaries load a
//! `.env` file first (dotenvy), so every setting can also live there.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_URL_EXPIRY_SECS: u64 = 300;

/// Runtime configuration for the storage service.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub storage_backend: Option<StorageBackend>,
    // OSS settings
    pub oss_bucket: Option<String>,
    pub oss_endpoint: Option<String>,
    pub oss_access_key_id: Option<String>,
    pub oss_access_key_secret: Option<String>,
    /// Bucket objects are world-readable; URLs are plain public URLs
    /// instead of presigned ones.
    pub oss_public: bool,
    // Local filesystem settings
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Default expiry for generated service URLs, in seconds.
    pub url_expiry_secs: Option<u64>,
}

impl Config {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        Config {
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| s.parse().ok()),
            oss_bucket: env_opt("OSS_BUCKET"),
            oss_endpoint: env_opt("OSS_ENDPOINT"),
            oss_access_key_id: env_opt("OSS_ACCESS_KEY_ID"),
            oss_access_key_secret: env_opt("OSS_ACCESS_KEY_SECRET"),
            oss_public: env_bool("OSS_PUBLIC", false),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            url_expiry_secs: env::var("URL_EXPIRY_SECS").ok().and_then(|s| s.parse().ok()),
        }
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.storage_backend
    }

    pub fn oss_bucket(&self) -> Option<&str> {
        self.oss_bucket.as_deref()
    }

    pub fn oss_endpoint(&self) -> Option<&str> {
        self.oss_endpoint.as_deref()
    }

    pub fn oss_access_key_id(&self) -> Option<&str> {
        self.oss_access_key_id.as_deref()
    }

    pub fn oss_access_key_secret(&self) -> Option<&str> {
        self.oss_access_key_secret.as_deref()
    }

    pub fn oss_public(&self) -> bool {
        self.oss_public
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    /// Expiry for generated URLs, falling back to the 5 minute default.
    pub fn url_expiry_secs(&self) -> u64 {
        self.url_expiry_secs.unwrap_or(DEFAULT_URL_EXPIRY_SECS)
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_expiry_defaults() {
        let config = Config::default();
        assert_eq!(config.url_expiry_secs(), 300);

        let config = Config {
            url_expiry_secs: Some(60),
            ..Config::default()
        };
        assert_eq!(config.url_expiry_secs(), 60);
    }

    #[test]
    fn accessors_deref_options() {
        let config = Config {
            oss_bucket: Some("attachments".to_string()),
            ..Config::default()
        };
        assert_eq!(config.oss_bucket(), Some("attachments"));
        assert_eq!(config.oss_endpoint(), None);
        assert!(!config.oss_public());
    }
}
