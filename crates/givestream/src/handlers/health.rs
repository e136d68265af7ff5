//! liveness endpoint.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokio::time::timeout;

use givestream_db::Store;

use crate::AppState;

/// content type for health responses, following the health+json convention.
const HEALTH_CONTENT_TYPE: &str = "application/health+json; charset=utf-8";

/// how long the database gets to answer the liveness ping.
const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// GET /health - liveness probe.
///
/// pings the database with a short timeout so a hung pool reads as down
/// instead of stalling the probe. answers 200 `{"status":"pass"}` when
/// healthy and 500 `{"status":"fail"}` when not.
pub async fn health(State(state): State<AppState>) -> Response {
    let healthy = matches!(timeout(PING_TIMEOUT, state.db.ping()).await, Ok(Ok(())));
    let (code, status) = if healthy {
        (StatusCode::OK, "pass")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "fail")
    };

    (
        code,
        [(header::CONTENT_TYPE, HEALTH_CONTENT_TYPE)],
        Json(json!({"status": status})),
    )
        .into_response()
}
