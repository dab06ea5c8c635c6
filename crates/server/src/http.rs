//! HTTP endpoints
//!
//! REST API for the booking assistant: session lifecycle plus one chat
//! endpoint per dialogue strategy.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        // Typed-chat flow (scripted state machine)
        .route("/api/chat/:session_id", post(chat))
        // Voice flow (delegated extraction)
        .route("/api/converse/:session_id", post(converse))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins. Falls back to permissive
/// when origin checks are disabled and to localhost when nothing is
/// configured or parseable.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let value = origin.parse::<HeaderValue>().ok();
            if value.is_none() {
                tracing::warn!("Invalid CORS origin: {}", origin);
            }
            value
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    // Credentials cannot be combined with wildcard headers, so the
    // explicit-origin branch names the headers it allows.
    tracing::info!("CORS configured with {} origins", parsed.len());
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Session creation response
#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: String,
    greeting: String,
}

/// Create a session
async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<CreateSessionResponse>, StatusCode> {
    let session = state.sessions.create().map_err(StatusCode::from)?;

    Ok(Json(CreateSessionResponse {
        session_id: session.id.clone(),
        greeting: state.scripted.greeting().to_string(),
    }))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state.sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let step = session.chat_state.lock().step;
    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "active": session.is_active(),
        "step": step.as_str(),
        "turn_count": session.turns(),
    })))
}

/// Delete session
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.sessions.remove(&id);
    StatusCode::NO_CONTENT
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    let count = sessions.len();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": count,
    }))
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Typed-chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    step: String,
    booking_confirmed: bool,
}

/// Typed-chat turn: one utterance through the scripted state machine
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    session.touch();

    let mut chat_state = session.chat_state.lock();
    let reply = state
        .scripted
        .advance(chat_state.clone(), &request.message);
    *chat_state = reply.state.clone();
    drop(chat_state);

    Ok(Json(ChatResponse {
        response: reply.response,
        step: reply.state.step.as_str().to_string(),
        booking_confirmed: reply
            .booking
            .as_ref()
            .is_some_and(|outcome| outcome.is_confirmed()),
    }))
}

/// Voice-flow response
#[derive(Debug, Serialize)]
struct ConverseResponse {
    response: String,
    booking_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmation: Option<String>,
}

/// Voice-flow turn: one utterance through the delegated driver. When the
/// completion sentinel fires, the booking is resolved in the same turn and
/// the confirmation text is returned alongside the reply.
async fn converse(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ConverseResponse>, StatusCode> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    session.touch();

    // Holding the history lock for the whole turn keeps delegated turns
    // strictly sequential within a session.
    let mut history = session.history.lock().await;
    let result = state.delegated.process_turn(&history, &request.message).await;
    *history = result.history.clone();

    let confirmation = if result.booking_ready {
        let outcome = state.delegated.complete_booking(&history).await;
        Some(outcome.to_string())
    } else {
        None
    };

    Ok(Json(ConverseResponse {
        response: result.response,
        booking_ready: result.booking_ready,
        confirmation,
    }))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check: the store must have its route reference set loaded
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.store.routes().is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "no routes loaded" })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready",
            "routes": state.store.routes().len(),
            "reservations": state.store.reservation_count(),
        })),
    )
}
