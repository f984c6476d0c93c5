#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-oss")]
use crate::OssStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use stratus_core::Config;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let backend = config.storage_backend().unwrap_or(StorageBackend::Oss);

    match backend {
        #[cfg(feature = "storage-oss")]
        StorageBackend::Oss => {
            let bucket = config
                .oss_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("OSS_BUCKET not configured".to_string()))?;
            let endpoint = config.oss_endpoint().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("OSS_ENDPOINT not configured".to_string())
            })?;
            let access_key_id = config.oss_access_key_id().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("OSS_ACCESS_KEY_ID not configured".to_string())
            })?;
            let access_key_secret =
                config
                    .oss_access_key_secret()
                    .map(String::from)
                    .ok_or_else(|| {
                        StorageError::ConfigError("OSS_ACCESS_KEY_SECRET not configured".to_string())
                    })?;

            let storage = OssStorage::new(
                bucket,
                endpoint,
                access_key_id,
                access_key_secret,
                config.oss_public(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-oss"))]
        StorageBackend::Oss => Err(StorageError::ConfigError(
            "OSS storage backend not available (storage-oss feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn local_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage_backend: Some(StorageBackend::Local),
            local_storage_path: Some(dir.path().to_string_lossy().into_owned()),
            local_storage_base_url: Some("http://localhost:3000/blobs".to_string()),
            ..Config::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert!(storage.supports_serving_disposition());
    }

    #[tokio::test]
    async fn missing_oss_settings_is_config_error() {
        let config = Config {
            storage_backend: Some(StorageBackend::Oss),
            ..Config::default()
        };

        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn missing_local_settings_is_config_error() {
        let config = Config {
            storage_backend: Some(StorageBackend::Local),
            ..Config::default()
        };

        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
