// HTTP surface - route table and the two request handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::resolver::{ResolveError, Resolver, TrackList};
use crate::streamer::{StreamError, Transcoder};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub transcoder: Arc<dyn Transcoder>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get-audio", post(get_audio))
        .route("/stream", get(stream))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct GetAudioRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamParams {
    #[serde(default)]
    url: Option<String>,
}

async fn health() -> &'static str {
    "ok"
}

/// POST /get-audio: resolve a source URL into an ordered track list.
async fn get_audio(
    State(state): State<AppState>,
    Json(request): Json<GetAudioRequest>,
) -> Result<Json<TrackList>, ResolveError> {
    let url = request.url.unwrap_or_default();
    let list = state.resolver.resolve(&url).await?;
    Ok(Json(list))
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// GET /stream?url=...: relay one transcoded MP3 stream.
///
/// The body is the transcoder's stdout verbatim and lives as long as the
/// process does. Accept-Ranges is advertised for player compatibility;
/// range requests themselves are not serviced.
async fn stream(State(state): State<AppState>, Query(params): Query<StreamParams>) -> Response {
    let input_url = match params.url {
        Some(url) if !url.is_empty() => url,
        _ => return StreamError::MissingUrl.into_response(),
    };

    let audio = match state.transcoder.spawn(&input_url) {
        Ok(audio) => audio,
        Err(err) => {
            error!(transcoder = state.transcoder.name(), error = %err, "transcoder start failed");
            return err.into_response();
        }
    };

    let body = Body::from_stream(ReaderStream::new(audio));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"stream.mp3\"",
            ),
            (header::ACCEPT_RANGES, "bytes"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}

impl IntoResponse for StreamError {
    // Plain-text errors on the stream endpoint, unlike the JSON resolver
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::Spawn(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
