//! Serving disposition rules for stored blobs.
//!
//! A blob is only served inline when its content type is known to render
//! safely in a browser; everything else is forced to `attachment`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Content types that may be served inline. Anything outside this set is
/// forced to download as an attachment.
const INLINE_CONTENT_TYPES: &[&str] = &[
    "image/png",
    "image/gif",
    "image/jpeg",
    "image/tiff",
    "image/bmp",
    "image/webp",
    "image/vnd.adobe.photoshop",
    "image/vnd.microsoft.icon",
    "application/pdf",
    "text/plain",
];

/// How a blob should be presented when downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Inline,
    Attachment,
}

impl FromStr for Disposition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(Disposition::Inline),
            "attachment" => Ok(Disposition::Attachment),
            _ => Err(anyhow::anyhow!("Invalid disposition: {}", s)),
        }
    }
}

impl Display for Disposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Disposition::Inline => write!(f, "inline"),
            Disposition::Attachment => write!(f, "attachment"),
        }
    }
}

/// Resolve the disposition a blob will actually be served with.
///
/// An explicit `Attachment` request always wins. An `Inline` request is
/// honored only for content types in the inline allowlist (plus audio and
/// video); unknown or missing content types fall back to `Attachment`.
pub fn serving_disposition(requested: Disposition, content_type: Option<&str>) -> Disposition {
    if requested == Disposition::Attachment {
        return Disposition::Attachment;
    }

    match content_type {
        Some(ct) if allowed_inline(ct) => Disposition::Inline,
        _ => Disposition::Attachment,
    }
}

fn allowed_inline(content_type: &str) -> bool {
    INLINE_CONTENT_TYPES.contains(&content_type)
        || content_type.starts_with("audio/")
        || content_type.starts_with("video/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_attachment_wins() {
        assert_eq!(
            serving_disposition(Disposition::Attachment, Some("image/png")),
            Disposition::Attachment
        );
    }

    #[test]
    fn inline_allowed_for_safe_types() {
        assert_eq!(
            serving_disposition(Disposition::Inline, Some("image/png")),
            Disposition::Inline
        );
        assert_eq!(
            serving_disposition(Disposition::Inline, Some("application/pdf")),
            Disposition::Inline
        );
        assert_eq!(
            serving_disposition(Disposition::Inline, Some("video/mp4")),
            Disposition::Inline
        );
    }

    #[test]
    fn inline_forced_to_attachment_for_unsafe_types() {
        // SVG and HTML can carry scripts
        assert_eq!(
            serving_disposition(Disposition::Inline, Some("image/svg+xml")),
            Disposition::Attachment
        );
        assert_eq!(
            serving_disposition(Disposition::Inline, Some("text/html")),
            Disposition::Attachment
        );
        assert_eq!(
            serving_disposition(Disposition::Inline, Some("application/zip")),
            Disposition::Attachment
        );
    }

    #[test]
    fn missing_content_type_is_attachment() {
        assert_eq!(
            serving_disposition(Disposition::Inline, None),
            Disposition::Attachment
        );
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(
            "inline".parse::<Disposition>().unwrap(),
            Disposition::Inline
        );
        assert_eq!(
            "Attachment".parse::<Disposition>().unwrap(),
            Disposition::Attachment
        );
        assert!("download".parse::<Disposition>().is_err());
        assert_eq!(Disposition::Inline.to_string(), "inline");
    }
}
