// Wire-level data models

use serde::{Deserialize, Serialize};

/// A single resolved track.
///
/// `url` is a time-limited signed media URL issued by the hosting platform.
/// It is carried opaquely: never parsed, rewritten, or refreshed. Clients
/// are expected to hand it to the stream endpoint before it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub url: String,
    /// Length in whole seconds; 0 when the platform reports none
    pub duration: u64,
}

/// Ordered resolution result.
///
/// Order matches the extractor's enumeration order (playlist order, or a
/// single element for a lone video). Duplicates are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackList {
    pub tracks: Vec<Track>,
}
