//! Blob key generation.
//!
//! Keys are opaque base36 tokens. Backends that cannot control the download
//! filename of a served URL (OSS public and presigned URLs carry no
//! `Content-Disposition`) get the sanitized filename appended as a trailing
//! path segment, so each blob lives in its own folder and its URL ends in
//! the real filename. Storage operations only ever see the finished key.

use uuid::Uuid;

use crate::disposition::{serving_disposition, Disposition};
use crate::filename::Filename;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of a base36-rendered u128, zero-padded.
const TOKEN_LEN: usize = 25;

/// Generate a storage key for a new blob.
///
/// The filename segment is appended only when all of the following hold:
/// the backend cannot set the serving disposition itself, a filename was
/// supplied, and the blob will be served as an attachment.
pub fn generate_key(
    filename: Option<&Filename>,
    content_type: Option<&str>,
    disposition: Disposition,
    backend_serves_disposition: bool,
) -> String {
    let token = secure_token();

    if backend_serves_disposition {
        return token;
    }
    let Some(filename) = filename else {
        return token;
    };
    if serving_disposition(disposition, content_type) != Disposition::Attachment {
        return token;
    }

    format!("{}/{}", token, filename.sanitized())
}

/// Random lowercase base36 token, 25 characters.
pub fn secure_token() -> String {
    let n = u128::from_be_bytes(*Uuid::new_v4().as_bytes());
    base36(n)
}

fn base36(mut n: u128) -> String {
    let mut buf = [b'0'; TOKEN_LEN];
    let mut i = TOKEN_LEN;
    while n > 0 {
        i -= 1;
        buf[i] = BASE36_ALPHABET[(n % 36) as usize];
        n /= 36;
    }
    // buf is ASCII by construction
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_base36(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    }

    #[test]
    fn token_shape() {
        let token = secure_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(is_base36(&token));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(secure_token(), secure_token());
    }

    #[test]
    fn plain_token_when_backend_serves_disposition() {
        let key = generate_key(
            Some(&Filename::new("report.zip")),
            Some("application/zip"),
            Disposition::Attachment,
            true,
        );
        assert!(!key.contains('/'));
    }

    #[test]
    fn plain_token_without_filename() {
        let key = generate_key(None, Some("application/zip"), Disposition::Attachment, false);
        assert!(!key.contains('/'));
    }

    #[test]
    fn plain_token_for_inline_blobs() {
        let key = generate_key(
            Some(&Filename::new("photo.png")),
            Some("image/png"),
            Disposition::Inline,
            false,
        );
        assert!(!key.contains('/'));
    }

    #[test]
    fn filename_folder_for_attachments_on_limited_backends() {
        let key = generate_key(
            Some(&Filename::new("quarterly report.xlsx")),
            Some("application/vnd.ms-excel"),
            Disposition::Inline,
            false,
        );
        let (token, name) = key.split_once('/').expect("key has filename segment");
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(is_base36(token));
        assert_eq!(name, "quarterly-report.xlsx");
    }
}
