// CLI AudioExtractor - drives the native `yt-dlp` binary
//
// Two invocation shapes:
// - enumeration: --flat-playlist --dump-single-json, playlist members by
//   identifier with no format resolution
// - audio resolution: --dump-json --no-playlist with an audio-only format
//   selector

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::traits::{AudioExtractor, ExtractorConfig};
use crate::resolver::errors::ExtractError;
use crate::resolver::models::Track;

/// Placeholder title when the platform reports none
const FALLBACK_TITLE: &str = "No title";

/// CLI-based audio extractor using the yt-dlp binary
pub struct CliAudioExtractor {
    ytdlp_path: String,
}

impl CliAudioExtractor {
    pub fn new() -> Self {
        Self {
            ytdlp_path: Self::find_ytdlp(),
        }
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
            "/opt/homebrew/bin/yt-dlp",
            "yt-dlp", // In PATH
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        // Try to find via `which`
        if let Ok(output) = std::process::Command::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Arguments shared by both invocation shapes
    fn common_args(config: &ExtractorConfig) -> Vec<String> {
        let mut args = Vec::new();

        if config.quiet {
            args.push("--quiet".to_string());
            args.push("--no-warnings".to_string());
        }

        if config.skip_download {
            args.push("--skip-download".to_string());
        }

        if let Some(path) = &config.cookie_file_path {
            args.push("--cookies".to_string());
            args.push(path.display().to_string());
        }

        args
    }

    fn enumerate_args(url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = Self::common_args(config);

        if config.flatten_playlist {
            args.push("--flat-playlist".to_string());
        }

        args.push("--dump-single-json".to_string());
        args.push(url.to_string());
        args
    }

    fn audio_args(url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = Self::common_args(config);

        args.push("-f".to_string());
        args.push(match &config.preferred_audio_format {
            Some(ext) => format!("bestaudio[ext={}]/bestaudio", ext),
            None => "bestaudio".to_string(),
        });

        args.push("--dump-json".to_string());
        args.push("--no-playlist".to_string());
        args.push(url.to_string());
        args
    }

    /// Run one yt-dlp invocation to completion and return its stdout.
    /// Exactly one attempt; there is no retry or client fallback here.
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, ExtractError> {
        debug!(ytdlp = %self.ytdlp_path, args = %args.join(" "), "invoking extractor");

        let output = Command::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ExtractError::ToolNotFound(format!("failed to run {}: {}", self.ytdlp_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::ExtractorFailed(stderr.trim().to_string()));
        }

        Ok(output.stdout)
    }
}

impl Default for CliAudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioExtractor for CliAudioExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn enumerate(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<String>, ExtractError> {
        let stdout = self.run(Self::enumerate_args(url, config)).await?;
        let info: serde_json::Value = serde_json::from_slice(&stdout)
            .map_err(|e| ExtractError::Parse(format!("invalid JSON: {}", e)))?;
        video_urls_from_info(&info)
    }

    async fn resolve_audio(
        &self,
        video_url: &str,
        config: &ExtractorConfig,
    ) -> Result<Track, ExtractError> {
        let stdout = self.run(Self::audio_args(video_url, config)).await?;
        let info: serde_json::Value = serde_json::from_slice(&stdout)
            .map_err(|e| ExtractError::Parse(format!("invalid JSON: {}", e)))?;
        track_from_info(&info)
    }
}

/// Turn a flat info dump into the ordered list of per-video URLs.
///
/// Playlist entries that are not objects, or that carry no string `id`,
/// are skipped rather than failing the listing; a partially broken
/// playlist still resolves its healthy members.
fn video_urls_from_info(info: &serde_json::Value) -> Result<Vec<String>, ExtractError> {
    match info.get("entries").and_then(|e| e.as_array()) {
        Some(entries) => {
            let mut urls = Vec::new();
            for entry in entries {
                match entry.get("id").and_then(|id| id.as_str()) {
                    Some(id) => urls.push(format!("https://www.youtube.com/watch?v={}", id)),
                    None => debug!("skipping playlist entry without id"),
                }
            }
            Ok(urls)
        }
        None => {
            let url = info["webpage_url"].as_str().ok_or_else(|| {
                ExtractError::Parse("info dump has neither entries nor webpage_url".to_string())
            })?;
            Ok(vec![url.to_string()])
        }
    }
}

/// Shape one non-flat info dump into a Track.
fn track_from_info(info: &serde_json::Value) -> Result<Track, ExtractError> {
    let url = match info["url"].as_str() {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Err(ExtractError::NoPlayableUrl),
    };

    let title = info["title"].as_str().unwrap_or(FALLBACK_TITLE).to_string();
    let duration = info["duration"].as_f64().unwrap_or(0.0).max(0.0) as u64;

    Ok(Track {
        title,
        url,
        duration,
    })
}
