//! API error handling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

const UPSTREAM_ERROR: &str = "GitHub API error";

/// API error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    MethodNotAllowed,
    NotFound,
    Unauthorized,
    /// Malformed body or invalid field.
    Validation(String),
    /// The repository host rejected a read or a write.
    Upstream(String),
    /// The host token lacks the scope to write.
    Permission,
    /// Branch protection blocked a direct write.
    ProtectedBranch(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Permission => StatusCode::FORBIDDEN,
            ApiError::ProtectedBranch(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ApiError::NotFound => json!({ "error": "Not found" }),
            ApiError::Unauthorized => json!({ "error": "Unauthorized" }),
            ApiError::Validation(details) => json!({
                "error": "validation",
                "details": details
            }),
            ApiError::Upstream(details) => json!({
                "error": UPSTREAM_ERROR,
                "details": details
            }),
            ApiError::Permission => json!({
                "error": UPSTREAM_ERROR,
                "details": "Token permission error - insufficient repository access"
            }),
            ApiError::ProtectedBranch(branch) => json!({
                "error": UPSTREAM_ERROR,
                "details": format!("Branch protection prevents direct write to {} branch", branch)
            }),
            ApiError::Internal(details) => json!({
                "error": "Internal server error",
                "details": details
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<topiko_core::Error> for ApiError {
    fn from(err: topiko_core::Error) -> Self {
        use topiko_core::Error;

        match err {
            Error::Validation(msg) => ApiError::Validation(msg),
            Error::Permission(_) => ApiError::Permission,
            Error::ProtectedBranch { branch, .. } => ApiError::ProtectedBranch(branch),
            Error::BaseBranchNotFound(_)
            | Error::UpstreamLookup { .. }
            | Error::UpstreamWrite { .. } => ApiError::Upstream(err.to_string()),
            Error::Serialization(_) | Error::InvalidContent(_) | Error::Internal(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topiko_core::{Error, HostError};

    #[test]
    fn test_core_errors_map_to_statuses() {
        let cases = [
            (
                Error::Validation("siteId must be a string".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::Permission(HostError::api(403, "nope")),
                StatusCode::FORBIDDEN,
            ),
            (
                Error::ProtectedBranch {
                    branch: "main".to_string(),
                    source: HostError::api(403, "protected"),
                },
                StatusCode::CONFLICT,
            ),
            (
                Error::UpstreamWrite {
                    action: "update file",
                    source: HostError::api(422, "bad"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::BaseBranchNotFound("main".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_upstream_details_carry_host_message() {
        let err = ApiError::from(Error::UpstreamWrite {
            action: "update file",
            source: HostError::api(422, "Invalid request"),
        });
        assert_eq!(
            err,
            ApiError::Upstream("failed to update file: 422 - Invalid request".to_string())
        );
    }
}
