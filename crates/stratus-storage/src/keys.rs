//! Shared key validation for storage backends.
//!
//! Keys are generated by `stratus_core::blob_key`, but backends also accept
//! caller-supplied keys, so every operation validates its key first. The
//! rules here keep keys usable as both object names and relative paths.

use crate::traits::{StorageError, StorageResult};

/// Validate a storage key (or key prefix).
///
/// Rejects empty keys, absolute paths, `..` segments, and NUL bytes.
pub(crate) fn validate(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must be relative: {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "key contains '..' segment: {}",
            key
        )));
    }
    if key.contains('\0') {
        return Err(StorageError::InvalidKey("key contains NUL".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_token_keys() {
        assert!(validate("0mgut9l2mkd0zachp8wvzi1jr").is_ok());
        assert!(validate("0mgut9l2mkd0zachp8wvzi1jr/report.pdf").is_ok());
    }

    #[test]
    fn rejects_empty_and_absolute() {
        assert!(matches!(validate(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            validate("/etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn rejects_traversal() {
        assert!(matches!(
            validate("../secrets"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate("a/../b"),
            Err(StorageError::InvalidKey(_))
        ));
        // ".." as a filename substring is fine
        assert!(validate("a/..b").is_ok());
        assert!(validate("a..b").is_ok());
    }
}
