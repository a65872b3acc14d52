use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{services::price_watch::RunError, AppState};

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// POST /invoke
pub async fn post_invoke_event(State(state): State<AppState>, body: Bytes) -> Response {
    // unparseable JSON is just another malformed event
    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "event is not valid JSON. Exiting...");
            return error_response(StatusCode::BAD_REQUEST, format!("invalid event JSON: {e}"));
        }
    };

    match state.watch.run_event(&event).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

// POST /invoke/store
pub async fn post_invoke_store(State(state): State<AppState>) -> Response {
    match state.watch.run_store().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e @ RunError::StoreNotConfigured) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
