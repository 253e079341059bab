// AudioExtractor trait and extractor configuration

use async_trait::async_trait;
use std::path::PathBuf;

use crate::resolver::errors::ExtractError;
use crate::resolver::models::Track;

/// Configuration for a single extractor invocation.
///
/// Every recognized option is an explicit field; nothing is forwarded as a
/// loose key/value map.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Suppress extractor progress and warning chatter
    pub quiet: bool,
    /// List playlist members by identifier without resolving their formats
    pub flatten_playlist: bool,
    /// Never let the extractor write media to disk
    pub skip_download: bool,
    /// Netscape cookie jar handed to the extractor, when one is available
    pub cookie_file_path: Option<PathBuf>,
    /// Preferred audio container (e.g. "m4a"); best available audio is the
    /// fallback when the preferred one is missing
    pub preferred_audio_format: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            quiet: true,
            flatten_playlist: false,
            skip_download: true,
            cookie_file_path: None,
            preferred_audio_format: None,
        }
    }
}

impl ExtractorConfig {
    pub fn with_flatten_playlist(mut self, enabled: bool) -> Self {
        self.flatten_playlist = enabled;
        self
    }

    pub fn with_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file_path = path;
        self
    }

    pub fn with_preferred_audio_format(mut self, format: Option<String>) -> Self {
        self.preferred_audio_format = format;
        self
    }
}

/// Boundary to the external extraction library.
///
/// The resolver only ever needs these two calls; everything upstream of
/// them (page scraping, signature decoding, format negotiation) belongs to
/// the external tool.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Enumerate the per-video URLs behind a source URL without resolving
    /// formats. A playlist yields its members in playlist order; a lone
    /// video yields exactly one URL.
    async fn enumerate(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<String>, ExtractError>;

    /// Resolve the best playable audio representation of a single video.
    async fn resolve_audio(
        &self,
        video_url: &str,
        config: &ExtractorConfig,
    ) -> Result<Track, ExtractError>;
}
