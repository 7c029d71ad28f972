//! HTTP API server.
//!
//! ## Endpoints
//!
//! - `POST /predict` - Route a ticket and return the unified prediction
//! - `POST /route_agent` - Alias of `/predict` (kept for web-interface callers)
//! - `GET  /health` - Agent + per-backend health report
//! - `GET  /stats` - Process-lifetime usage statistics
//! - `GET  /` - Service description and routing-rule summary
//!
//! Every response carries an `X-Request-ID` header (client-supplied or
//! generated) and permissive CORS headers so the static web page can call
//! the agent cross-origin.

use crate::client::ClassifierClient;
use crate::dispatch::{Dispatcher, UnifiedResponse};
use crate::health::{self, HealthStatus};
use crate::stats::StatsCollector;
use crate::{AgentConfig, AgentError, Backend};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

/// Shared application state available to all handlers.
pub struct AppState {
    dispatcher: Dispatcher,
    client: Arc<dyn ClassifierClient>,
    stats: Arc<StatsCollector>,
}

impl AppState {
    /// Assemble the application state from its collaborators.
    pub fn new(
        dispatcher: Dispatcher,
        client: Arc<dyn ClassifierClient>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            dispatcher,
            client,
            stats,
        }
    }
}

/// JSON body for `POST /predict` and `POST /route_agent`.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketRequest {
    /// The free-text ticket to classify.
    pub text: String,
    /// Optional backend override tag (`fast_lexical` or `neural_multilingual`).
    #[serde(default)]
    pub force_model: Option<String>,
}

/// Build the axum router over the given state.
///
/// # Panics
///
/// This function never panics.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/predict", post(predict_handler))
        .route("/route_agent", post(predict_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server. Blocks until the server shuts down.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
///
/// # Panics
///
/// This function never panics.
pub async fn run_server(
    config: &AgentConfig,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("routing agent listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Middleware
// ============================================================================

/// Adds a unique `X-Request-ID` header to every response.
///
/// A client-supplied `X-Request-ID` is preserved; otherwise a new UUID v4
/// is generated.
///
/// # Panics
///
/// This function never panics.
async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /predict` - Route a ticket and return the unified prediction.
///
/// # Panics
///
/// This function never panics.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TicketRequest>,
) -> Result<Json<UnifiedResponse>, ApiError> {
    let response = state
        .dispatcher
        .dispatch(&req.text, req.force_model.as_deref())
        .await?;
    Ok(Json(response))
}

/// `GET /health` - Agent + per-backend health.
///
/// Always 200: the agent itself is healthy if it can answer, and each
/// backend entry carries its own status string.
///
/// # Panics
///
/// This function never panics.
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let report = health::check_all(&state.client).await;

    // BTreeMap for a stable key order in the JSON body.
    let backends: BTreeMap<&'static str, &'static str> = report
        .iter()
        .map(|(backend, health)| (backend.as_str(), health.status.as_str()))
        .collect();

    let degraded = report
        .values()
        .filter(|h| h.status != HealthStatus::Healthy)
        .count();
    if degraded > 0 {
        info!(degraded, "health query found degraded backends");
    }

    Json(serde_json::json!({
        "agent": "healthy",
        "backends": backends,
    }))
}

/// `GET /stats` - Usage statistics snapshot.
///
/// # Panics
///
/// This function never panics.
async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<crate::stats::StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// `GET /` - Service description and routing-rule summary.
///
/// # Panics
///
/// This function never panics.
async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "ticket-router",
        "version": env!("CARGO_PKG_VERSION"),
        "backends": [Backend::FastLexical.as_str(), Backend::NeuralMultilingual.as_str()],
        "routing_rules": {
            "short_text": "< 10 words -> fast_lexical",
            "multilingual": "fr/ar -> neural_multilingual",
            "long_text": "> 25 words -> neural_multilingual",
            "default": "standard -> fast_lexical",
        },
    }))
}

// ============================================================================
// Error mapping
// ============================================================================

/// HTTP-facing wrapper around [`AgentError`].
///
/// Each variant maps to a status code and a JSON error body; the backend's
/// own status codes propagate unchanged.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug)]
pub struct ApiError(AgentError);

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AgentError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AgentError::BackendUnavailable { backend, .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("backend {backend} unavailable"),
            ),
            AgentError::BackendError { backend, status } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("backend {backend} returned an error"),
            ),
            AgentError::Config(_) | AgentError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
