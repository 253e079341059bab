// Audio resolution - validation plus sequential per-video orchestration
// on top of the extractor boundary

pub mod errors;
pub mod extractors;
pub mod models;

pub use errors::{ExtractError, ResolveError};
pub use extractors::{AudioExtractor, CliAudioExtractor, ExtractorConfig};
pub use models::{Track, TrackList};

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::credentials::Credentials;

/// Hostnames the service resolves; anything else is rejected up front.
const ALLOWED_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Resolves a source URL into an ordered track list.
///
/// One enumeration call, then one audio-resolution call per video, strictly
/// in enumeration order. Per-video failures drop the entry; an enumeration
/// failure aborts the whole request.
pub struct Resolver {
    extractor: Arc<dyn AudioExtractor>,
    flat_config: ExtractorConfig,
    audio_config: ExtractorConfig,
}

impl Resolver {
    pub fn new(extractor: Arc<dyn AudioExtractor>, credentials: &Credentials) -> Self {
        let cookie_file = credentials.cookie_file().map(|p| p.to_path_buf());

        Self {
            flat_config: ExtractorConfig::default()
                .with_flatten_playlist(true)
                .with_cookie_file(cookie_file.clone()),
            audio_config: ExtractorConfig::default()
                .with_preferred_audio_format(Some("m4a".to_string()))
                .with_cookie_file(cookie_file),
            extractor,
        }
    }

    pub async fn resolve(&self, source_url: &str) -> Result<TrackList, ResolveError> {
        let source_url = validate_source_url(source_url)?;

        let video_urls = self
            .extractor
            .enumerate(source_url.as_str(), &self.flat_config)
            .await?;
        debug!(
            extractor = self.extractor.name(),
            count = video_urls.len(),
            "enumerated videos"
        );

        // An empty list is a valid outcome: enumeration worked, every
        // member happened to be unresolvable.
        let mut tracks = Vec::new();
        for video_url in &video_urls {
            match self
                .extractor
                .resolve_audio(video_url, &self.audio_config)
                .await
            {
                Ok(track) => tracks.push(track),
                Err(err) => {
                    warn!(video_url = %video_url, error = %err, "dropping unresolvable entry");
                }
            }
        }

        Ok(TrackList { tracks })
    }
}

/// Reject anything that is not an http(s) URL on an allow-listed hostname.
fn validate_source_url(raw: &str) -> Result<Url, ResolveError> {
    if raw.is_empty() {
        return Err(ResolveError::Validation("URL missing".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| ResolveError::Validation(format!("invalid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResolveError::Validation(format!(
            "unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ResolveError::Validation("URL has no host".to_string()))?
        .to_ascii_lowercase();

    if !is_allowed_host(&host) {
        return Err(ResolveError::Validation(format!(
            "unsupported host: {}",
            host
        )));
    }

    Ok(url)
}

fn is_allowed_host(host: &str) -> bool {
    ALLOWED_HOSTS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Extractor scripted per test: a fixed enumeration plus per-URL
    /// resolution outcomes.
    struct ScriptedExtractor {
        enumeration: Result<Vec<String>, ExtractError>,
        outcomes: HashMap<String, Result<Track, ExtractError>>,
    }

    impl ScriptedExtractor {
        fn new(enumeration: Result<Vec<String>, ExtractError>) -> Self {
            Self {
                enumeration,
                outcomes: HashMap::new(),
            }
        }

        fn with_track(mut self, video_url: &str, title: &str) -> Self {
            self.outcomes.insert(
                video_url.to_string(),
                Ok(Track {
                    title: title.to_string(),
                    url: format!("{}/audio", video_url),
                    duration: 60,
                }),
            );
            self
        }

        fn with_failure(mut self, video_url: &str) -> Self {
            self.outcomes
                .insert(video_url.to_string(), Err(ExtractError::NoPlayableUrl));
            self
        }
    }

    #[async_trait]
    impl AudioExtractor for ScriptedExtractor {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn enumerate(
            &self,
            _url: &str,
            _config: &ExtractorConfig,
        ) -> Result<Vec<String>, ExtractError> {
            self.enumeration.clone()
        }

        async fn resolve_audio(
            &self,
            video_url: &str,
            _config: &ExtractorConfig,
        ) -> Result<Track, ExtractError> {
            self.outcomes
                .get(video_url)
                .cloned()
                .unwrap_or(Err(ExtractError::NoPlayableUrl))
        }
    }

    fn resolver(extractor: ScriptedExtractor) -> Resolver {
        Resolver::new(Arc::new(extractor), &Credentials::none())
    }

    #[tokio::test]
    async fn empty_url_fails_validation() {
        let r = resolver(ScriptedExtractor::new(Ok(vec![])));
        assert!(matches!(
            r.resolve("").await,
            Err(ResolveError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn non_url_input_fails_validation() {
        let r = resolver(ScriptedExtractor::new(Ok(vec![])));
        assert!(matches!(
            r.resolve("not a url at all").await,
            Err(ResolveError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn foreign_host_fails_validation() {
        let r = resolver(ScriptedExtractor::new(Ok(vec![])));
        assert!(matches!(
            r.resolve("https://vimeo.com/12345").await,
            Err(ResolveError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn lookalike_host_fails_validation() {
        let r = resolver(ScriptedExtractor::new(Ok(vec![])));
        assert!(matches!(
            r.resolve("https://notyoutube.com/watch?v=x").await,
            Err(ResolveError::Validation(_))
        ));
    }

    #[test]
    fn allowed_hosts_include_subdomains() {
        assert!(is_allowed_host("youtube.com"));
        assert!(is_allowed_host("www.youtube.com"));
        assert!(is_allowed_host("music.youtube.com"));
        assert!(is_allowed_host("youtu.be"));
        assert!(!is_allowed_host("example.com"));
        assert!(!is_allowed_host("youtu.be.evil.com"));
    }

    #[tokio::test]
    async fn single_video_yields_at_most_one_track() {
        let video = "https://www.youtube.com/watch?v=solo";
        let r = resolver(
            ScriptedExtractor::new(Ok(vec![video.to_string()])).with_track(video, "Solo"),
        );

        let list = r.resolve("https://youtu.be/solo").await.unwrap();
        assert_eq!(list.tracks.len(), 1);
        assert_eq!(list.tracks[0].title, "Solo");
    }

    #[tokio::test]
    async fn playlist_order_is_preserved() {
        let urls: Vec<String> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| format!("https://www.youtube.com/watch?v={}", id))
            .collect();
        let mut extractor = ScriptedExtractor::new(Ok(urls.clone()));
        for (url, title) in urls.iter().zip(["A", "B", "C", "D"]) {
            extractor = extractor.with_track(url, title);
        }

        let list = resolver(extractor)
            .resolve("https://www.youtube.com/playlist?list=PLx")
            .await
            .unwrap();
        let titles: Vec<&str> = list.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn failing_entry_is_dropped_without_affecting_siblings() {
        let urls: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|id| format!("https://www.youtube.com/watch?v={}", id))
            .collect();
        let extractor = ScriptedExtractor::new(Ok(urls.clone()))
            .with_track(&urls[0], "A")
            .with_failure(&urls[1])
            .with_track(&urls[2], "C");

        let list = resolver(extractor)
            .resolve("https://www.youtube.com/playlist?list=PLx")
            .await
            .unwrap();
        let titles: Vec<&str> = list.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn all_entries_failing_is_an_empty_success() {
        let urls: Vec<String> = ["a", "b"]
            .iter()
            .map(|id| format!("https://www.youtube.com/watch?v={}", id))
            .collect();
        let extractor = ScriptedExtractor::new(Ok(urls.clone()))
            .with_failure(&urls[0])
            .with_failure(&urls[1]);

        let list = resolver(extractor)
            .resolve("https://www.youtube.com/playlist?list=PLx")
            .await
            .unwrap();
        assert!(list.tracks.is_empty());
    }

    #[tokio::test]
    async fn enumeration_failure_aborts_the_request() {
        let extractor = ScriptedExtractor::new(Err(ExtractError::ExtractorFailed(
            "ERROR: This playlist does not exist".to_string(),
        )));

        let err = resolver(extractor)
            .resolve("https://www.youtube.com/playlist?list=PLx")
            .await
            .unwrap_err();
        match err {
            ResolveError::Extraction(msg) => assert!(msg.contains("does not exist")),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cookie_file_reaches_both_configs() {
        let video = "https://www.youtube.com/watch?v=solo";
        let extractor =
            ScriptedExtractor::new(Ok(vec![video.to_string()])).with_track(video, "Solo");
        let credentials =
            Credentials::with_cookie_file(std::path::PathBuf::from("cookies.txt"));
        let r = Resolver::new(Arc::new(extractor), &credentials);

        assert_eq!(
            r.flat_config.cookie_file_path.as_deref(),
            Some(std::path::Path::new("cookies.txt"))
        );
        assert_eq!(
            r.audio_config.cookie_file_path.as_deref(),
            Some(std::path::Path::new("cookies.txt"))
        );
        assert!(r.flat_config.flatten_playlist);
        assert!(!r.audio_config.flatten_playlist);
    }
}
