//! Socratis server
//!
//! Serves one tutoring session over HTTP with live updates via SSE.

use socratis::api::{create_router, AppState};
use socratis::llm::LlmConfig;
use socratis::runtime::{RandomProgression, SessionRuntime, StepProgression};
use socratis::tutor::{Tutor, TutorGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socratis=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("SOCRATIS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let llm_config = LlmConfig::from_env();
    if !llm_config.has_credentials() {
        tracing::warn!(
            "No Gemini credential configured. Set GEMINI_API_KEY or LLM_GATEWAY; replies will fail."
        );
    }

    let gateway: Arc<dyn TutorGateway> = Arc::new(Tutor::from_config(&llm_config)?);
    let progression: Arc<dyn StepProgression> = Arc::new(RandomProgression::default());
    let state = AppState::new(SessionRuntime::new(gateway, progression));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Socratis server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
