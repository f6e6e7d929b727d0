//! Publish endpoint.
//!
//! Request handling order: CORS preflight, liveness (preview only), method,
//! path, shared secret, body validation, then the publish itself.

use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use topiko_core::{CommitResult, PublishRequest, PublishTarget, Secret};
use tracing::{error, info, warn};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::health;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-topiko-secret";

const ALLOWED_HEADERS: &str = "Content-Type, x-topiko-secret";

/// Largest request body read before a request is rejected.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct PublishResponse {
    status: &'static str,
    #[serde(flatten)]
    commit: CommitResult,
}

/// Entry point for every request the gateway receives.
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let target = state.target;

    if method == Method::OPTIONS {
        return preflight(target);
    }

    if method == Method::GET && target == PublishTarget::Preview {
        return (cors_headers(target), health::liveness().await).into_response();
    }

    if method != Method::POST {
        return ApiError::MethodNotAllowed.into_response();
    }

    if uri.path() != target.endpoint() {
        return ApiError::NotFound.into_response();
    }

    match publish(&state, &headers, body).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn publish(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<Json<PublishResponse>, ApiError> {
    let target = state.target;

    authorize(&state.shared_secret, headers)?;

    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        info!(flow = target.as_str(), error = %e, "Unreadable request body");
        ApiError::Validation(format!("Request body exceeds {} bytes", MAX_BODY_BYTES))
    })?;

    let request = PublishRequest::parse(&body, target).map_err(|e| {
        info!(flow = target.as_str(), error = %e, "Rejected publish request");
        ApiError::from(e)
    })?;

    let commit = state
        .publisher
        .publish(target, &request)
        .await
        .map_err(|e| {
            error!(
                site_id = %request.site_id,
                flow = target.as_str(),
                error = %e,
                "Publish failed"
            );
            ApiError::from(e)
        })?;

    info!(
        site_id = %request.site_id,
        branch = %commit.branch,
        commit_sha = %commit.commit_sha,
        "Site configuration published"
    );

    Ok(Json(PublishResponse {
        status: target.success_status(),
        commit,
    }))
}

fn authorize(secret: &Secret, headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(value) if secret.matches(value) => Ok(()),
        _ => {
            warn!(header_present = presented.is_some(), "Rejected request with bad secret");
            Err(ApiError::Unauthorized)
        }
    }
}

fn cors_headers(target: PublishTarget) -> [(axum::http::HeaderName, &'static str); 2] {
    let methods = match target {
        PublishTarget::Preview => "GET, POST, OPTIONS",
        PublishTarget::Production => "POST, OPTIONS",
    };
    [
        (ACCESS_CONTROL_ALLOW_METHODS, methods),
        (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
    ]
}

fn preflight(target: PublishTarget) -> Response {
    match target {
        PublishTarget::Preview => (
            StatusCode::NO_CONTENT,
            cors_headers(target),
            [(ACCESS_CONTROL_MAX_AGE, "86400")],
        )
            .into_response(),
        PublishTarget::Production => (StatusCode::OK, cors_headers(target)).into_response(),
    }
}
