//! URL validation and filename derivation.
//!
//! The output filename is the URL's last `/`-delimited segment, taken
//! verbatim from the raw string: no sanitization, no percent-decoding, and a
//! query string (if any) stays part of the name. Two URLs that end in the
//! same segment write the same file.

use std::fmt;

/// Why a URL cannot be part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// Not parseable as an absolute URL.
    Malformed(String),
    /// Parsed, but the scheme is not http or https.
    UnsupportedScheme(String),
    /// Nothing after the last `/` to use as a filename.
    EmptyFilename,
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::Malformed(e) => write!(f, "malformed URL: {}", e),
            UrlError::UnsupportedScheme(s) => write!(f, "unsupported scheme '{}' (expected http or https)", s),
            UrlError::EmptyFilename => write!(f, "URL has no final path segment to use as a filename"),
        }
    }
}

impl std::error::Error for UrlError {}

/// Returns the last `/`-delimited segment of `url`, or `None` if the URL
/// contains no `/` or ends with one.
///
/// `last_segment("https://host/a/b/pic.jpg") == Some("pic.jpg")`
pub fn last_segment(url: &str) -> Option<&str> {
    let (_, segment) = url.rsplit_once('/')?;
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Checks that `url` is an absolute http(s) URL with a usable filename and
/// returns that filename.
pub fn validate_url(url: &str) -> Result<&str, UrlError> {
    let parsed = url::Url::parse(url).map_err(|e| UrlError::Malformed(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }
    // The filename must come after the authority: "https://example.com" has none.
    let after_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or(UrlError::EmptyFilename)?;
    match last_segment(after_scheme) {
        Some(name) if name != "." && name != ".." => Ok(name),
        _ => Err(UrlError::EmptyFilename),
    }
}
