//! Axum route handlers for the content-ops HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`              - Returns `{"status": "ok", "version": ..., "service": "content-ops"}`
//! - `GET  /capabilities`        - Lists capabilities with their JSON schemas
//! - `POST /actions/:capability` - Runs a capability, returns its `Envelope`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::capabilities::{CapabilityRegistry, CapabilitySummary};
use crate::gateway::{ActionGateway, Envelope};
use crate::llms::StructuredModel;

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gateway: ActionGateway,
}

impl AppState {
    pub fn new(registry: CapabilityRegistry, model: Arc<dyn StructuredModel>) -> Self {
        Self {
            gateway: ActionGateway::new(Arc::new(registry), model),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/capabilities", get(list_capabilities_handler))
        .route("/actions/:capability", post(run_action_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "content-ops",
    }))
}

/// GET /capabilities - every registered capability, ordered by key.
async fn list_capabilities_handler(State(state): State<AppState>) -> Json<Vec<CapabilitySummary>> {
    Json(
        state
            .gateway
            .registry()
            .list()
            .into_iter()
            .map(|capability| capability.summary())
            .collect(),
    )
}

/// POST /actions/:capability - run one capability.
///
/// Flow failures are part of the envelope and still answer 200. An unknown
/// key answers 404 and a body that is not JSON answers 400, both with a
/// failure envelope.
async fn run_action_handler(
    State(state): State<AppState>,
    Path(capability): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<Envelope>) {
    if state.gateway.registry().get(&capability).is_none() {
        log::warn!("Request for unknown capability '{}'", capability);
        return (
            StatusCode::NOT_FOUND,
            Json(Envelope::failure(format!(
                "Unknown capability '{}'.",
                capability
            ))),
        );
    }

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::warn!("Rejected body for '{}': {}", capability, rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(Envelope::failure("Request body must be a JSON object.")),
            );
        }
    };

    let envelope = state.gateway.run_capability(&capability, request).await;
    (StatusCode::OK, Json(envelope))
}
