// Error types for audio resolution

use std::fmt;

/// Failure of a single per-video extraction.
///
/// These are absorbed by the resolver: the affected entry is logged and
/// dropped, sibling entries are unaffected.
#[derive(Debug, Clone)]
pub enum ExtractError {
    /// yt-dlp binary missing or could not be launched
    ToolNotFound(String),

    /// Extractor ran but exited unsuccessfully
    ExtractorFailed(String),

    /// Failed to parse extractor JSON output
    Parse(String),

    /// Extraction succeeded but carried no playable audio URL
    NoPlayableUrl,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolNotFound(msg) => write!(f, "extractor not found: {}", msg),
            Self::ExtractorFailed(msg) => write!(f, "extractor failed: {}", msg),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
            Self::NoPlayableUrl => write!(f, "no playable audio URL in extractor output"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Request-level resolution failure surfaced to the client.
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// Missing or malformed source URL; nothing was extracted
    Validation(String),

    /// Top-level enumeration failed; the whole request aborts
    Extraction(String),
}

impl fmt::Display for ResolveError {
    // The message is the response body's `error` field, so it is emitted
    // verbatim with no variant prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) | Self::Extraction(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ExtractError> for ResolveError {
    fn from(err: ExtractError) -> Self {
        Self::Extraction(err.to_string())
    }
}
