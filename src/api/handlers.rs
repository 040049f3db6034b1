//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    CatalogResponse, CatalogSuggestion, ErrorResponse, SelectTopicRequest, SendMessageRequest,
    SendMessageResponse, SuccessResponse, ViewResponse,
};
use super::AppState;
use crate::attachment::ImageData;
use crate::catalog::{suggestion_text, INITIAL_SUGGESTIONS, TOPICS};
use crate::runtime::SessionEvent;
use crate::state_machine::{SessionSnapshot, TransitionError};
use crate::view;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session state
        .route("/api/session", get(get_session))
        .route("/api/view", get(get_view))
        .route("/api/catalog", get(get_catalog))
        // Intents
        .route("/api/messages", post(send_message))
        .route("/api/topic", post(select_topic))
        // SSE streaming
        .route("/api/stream", get(stream_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Reads
// ============================================================

async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.runtime.snapshot().await)
}

async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let session = state.runtime.state().await;
    Json(ViewResponse {
        view: view::render(&session),
    })
}

async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        topics: TOPICS.to_vec(),
        suggestions: INITIAL_SUGGESTIONS
            .iter()
            .map(|s| CatalogSuggestion {
                label: *s,
                text: suggestion_text(s),
            })
            .collect(),
    })
}

async fn stream_session(State(state): State<AppState>) -> impl IntoResponse {
    let (snapshot, broadcast_rx) = state.runtime.attach().await;
    sse_stream(SessionEvent::Init { snapshot }, broadcast_rx)
}

async fn get_version() -> &'static str {
    concat!("socratis ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Intents
// ============================================================

/// Accept the message now; the tutor round trip runs in the background and
/// is observable over SSE
async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), AppError> {
    let image = req
        .image
        .as_deref()
        .map(ImageData::from_data_uri)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let effects = state
        .runtime
        .submit_message(req.text, image)
        .await
        .map_err(AppError::from)?;

    let runtime = state.runtime.clone();
    tokio::spawn(async move {
        runtime.drive(effects).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageResponse { queued: true }),
    ))
}

async fn select_topic(
    State(state): State<AppState>,
    Json(req): Json<SelectTopicRequest>,
) -> Json<SuccessResponse> {
    state.runtime.select_topic(req.label).await;
    Json(SuccessResponse::ok())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Busy => AppError::Conflict(e.to_string()),
            TransitionError::EmptyMessage => AppError::BadRequest(e.to_string()),
            TransitionError::InvalidTransition(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
