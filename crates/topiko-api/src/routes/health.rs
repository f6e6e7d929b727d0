//! Liveness probe.

use axum::Json;
use serde_json::{Value, json};

/// Body returned to unauthenticated `GET`s on the preview gateway.
pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "ok", "worker": "preview" }))
}
