//! Upload integrity checks.
//!
//! Checksums cross the wire as base64-encoded MD5 digests. Verification
//! happens before the backend write, so a mismatch never leaves a partial
//! object behind.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::traits::{StorageError, StorageResult};

/// Base64-encoded MD5 digest of `data`.
pub fn base64_md5(data: &[u8]) -> String {
    STANDARD.encode(md5::compute(data).0)
}

/// Verify `data` against an expected base64 MD5 checksum.
pub(crate) fn verify(key: &str, data: &[u8], expected: &str) -> StorageResult<()> {
    let actual = base64_md5(data);
    if actual != expected {
        return Err(StorageError::IntegrityCheckFailed {
            key: key.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
