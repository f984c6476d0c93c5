//! Filename handling for stored blobs.
//!
//! Filenames are caller-supplied and untrusted. `Filename::sanitized` maps
//! path-hostile characters before a name is embedded in a storage key, and
//! `content_disposition_with` renders the RFC 6266 header value (with the
//! RFC 5987 `filename*` parameter) used when a backend can control the
//! download filename itself.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::disposition::Disposition;

/// Percent-encoding set for RFC 5987 `attr-char`: everything outside
/// `ALPHA / DIGIT / ! # $ & + - . ^ _ ` | ~` is escaped.
const RFC5987_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// A blob's original filename.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Filename(String);

impl Filename {
    pub fn new(name: impl Into<String>) -> Self {
        Filename(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename with path-hostile characters replaced, safe to embed as a
    /// storage key segment. Never empty.
    pub fn sanitized(&self) -> String {
        let sanitized: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();

        if sanitized.trim_matches(|c| c == '.' || c == '-').is_empty() {
            "unnamed".to_string()
        } else {
            sanitized
        }
    }

    /// ASCII-only fallback for the plain `filename=` parameter. Non-ASCII
    /// characters become `?`; quotes and backslashes are escaped.
    fn ascii_fallback(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            match c {
                '"' | '\\' => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_ascii() => out.push(c),
                _ => out.push('?'),
            }
        }
        out
    }

    /// Both `Content-Disposition` filename parameters, per RFC 6266.
    pub fn parameters(&self) -> String {
        format!(
            "filename=\"{}\"; filename*=UTF-8''{}",
            self.ascii_fallback(),
            utf8_percent_encode(&self.0, RFC5987_ESCAPE)
        )
    }
}

impl std::fmt::Display for Filename {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Filename {
    fn from(name: &str) -> Self {
        Filename::new(name)
    }
}

/// Render a full `Content-Disposition` header value.
pub fn content_disposition_with(disposition: Disposition, filename: &Filename) -> String {
    format!("{}; {}", disposition, filename.parameters())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_keeps_safe_names() {
        assert_eq!(Filename::new("invoice.pdf").sanitized(), "invoice.pdf");
        assert_eq!(Filename::new("report_v2-final.txt").sanitized(), "report_v2-final.txt");
    }

    #[test]
    fn sanitized_replaces_hostile_characters() {
        assert_eq!(Filename::new("my file (1).pdf").sanitized(), "my-file--1-.pdf");
        assert_eq!(Filename::new("a/b\\c.txt").sanitized(), "a-b-c.txt");
        assert_eq!(Filename::new("日本語.pdf").sanitized(), "---.pdf");
    }

    #[test]
    fn sanitized_never_empty() {
        assert_eq!(Filename::new("").sanitized(), "unnamed");
        assert_eq!(Filename::new("///").sanitized(), "unnamed");
        assert_eq!(Filename::new("..").sanitized(), "unnamed");
    }

    #[test]
    fn ascii_fallback_replaces_non_ascii() {
        assert_eq!(Filename::new("résumé.pdf").ascii_fallback(), "r?sum?.pdf");
        assert_eq!(
            Filename::new("quo\"te.txt").ascii_fallback(),
            "quo\\\"te.txt"
        );
    }

    #[test]
    fn parameters_include_rfc5987_encoding() {
        let params = Filename::new("café.png").parameters();
        assert_eq!(
            params,
            "filename=\"caf?.png\"; filename*=UTF-8''caf%C3%A9.png"
        );
    }

    #[test]
    fn content_disposition_renders_header_value() {
        let value = content_disposition_with(Disposition::Attachment, &Filename::new("a b.txt"));
        assert_eq!(
            value,
            "attachment; filename=\"a b.txt\"; filename*=UTF-8''a%20b.txt"
        );
    }
}
