//! API routes.

pub mod gateway;
pub mod health;

use crate::AppState;
use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use tower_http::set_header::SetResponseHeaderLayer;

/// Build the gateway router.
///
/// The gateway owns its whole URL space: method and path checks happen in
/// [`gateway::handle`], so every request goes through the fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(gateway::handle)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
}
