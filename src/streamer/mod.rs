// Streaming transcoder boundary - error type, trait, and the live audio
// stream handed to the HTTP layer

mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::process::Child;

/// Streaming failure surfaced by the stream endpoint.
#[derive(Debug, Clone)]
pub enum StreamError {
    /// The `url` query parameter was absent; nothing was spawned
    MissingUrl,

    /// Launching the transcoding binary failed before any bytes were sent
    Spawn(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "url query parameter is required"),
            Self::Spawn(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StreamError {}

/// Live transcoded audio: the child's stdout, with the child kept alive for
/// as long as the stream is being read.
///
/// The child is spawned kill-on-drop, so dropping the response body (client
/// disconnect included) terminates the process instead of leaking it.
pub struct AudioStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    _child: Option<Child>,
}

impl AudioStream {
    pub(crate) fn from_child(mut child: Child) -> Result<Self, StreamError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StreamError::Spawn("transcoder stdout was not captured".to_string()))?;

        Ok(Self {
            reader: Box::new(stdout),
            _child: Some(child),
        })
    }

    /// Stream from any reader instead of a process. Lets tests assert
    /// byte-for-byte passthrough without a real binary.
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            _child: None,
        }
    }
}

impl AsyncRead for AudioStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

/// Boundary to the external transcoding binary.
pub trait Transcoder: Send + Sync {
    /// Name of the transcoder (for logging)
    fn name(&self) -> &'static str;

    /// Launch one transcode of `input_url`. Exactly one attempt, no retry;
    /// the returned stream lives as long as the process does.
    fn spawn(&self, input_url: &str) -> Result<AudioStream, StreamError>;
}
