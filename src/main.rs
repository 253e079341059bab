use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use youtube_audio_relay::api::{router, AppState};
use youtube_audio_relay::credentials::Credentials;
use youtube_audio_relay::resolver::{CliAudioExtractor, Resolver};
use youtube_audio_relay::streamer::FfmpegTranscoder;

const DEFAULT_PORT: u16 = 5050;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Credentials are read from the environment exactly once; request
    // handling never consults the environment.
    let credentials = Credentials::from_env();

    let state = AppState {
        resolver: Arc::new(Resolver::new(
            Arc::new(CliAudioExtractor::new()),
            &credentials,
        )),
        transcoder: Arc::new(FfmpegTranscoder::new()),
    };

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    Ok(())
}

async fn shutdown_signal() {
    // Failure here only affects graceful shutdown; the process still
    // terminates when the signal fires.
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
    }
}
