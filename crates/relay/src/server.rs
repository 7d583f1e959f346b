//! HTTP server for alert webhooks.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::alerts::AlertWriter;
use crate::payload::AlertEvent;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Alert pipeline entry point.
    pub writer: AlertWriter,
}

/// Build the HTTP router for the relay service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/hooks/alert", post(alert_webhook_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Handle one inbound alert webhook.
///
/// The body must be a single JSON object; field extraction is defensive and
/// never rejects a request on its own. Every downstream failure (timestamp,
/// payload, or store) surfaces as `500` with the underlying message.
pub async fn alert_webhook_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, String) {
    // Decode into an object map; a body that is valid JSON but not an
    // object is a parse failure, not a downstream error.
    let data: Value = match serde_json::from_slice::<serde_json::Map<String, Value>>(&body) {
        Ok(object) => Value::Object(object),
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Error parsing webhook: {e}"),
            );
        }
    };

    let event = match AlertEvent::from_value(&data) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "Failed to re-serialize detection payload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error serializing detection payload: {e}"),
            );
        }
    };

    info!(
        name = %event.name,
        hostname = %event.hostname,
        "Received alert webhook"
    );

    match state.writer.write(&event).await {
        Ok(()) => (StatusCode::OK, "Alert added successfully".to_string()),
        Err(e) => {
            error!(error = %e, name = %event.name, "Failed to add alert");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to add alert: {e}"),
            )
        }
    }
}
