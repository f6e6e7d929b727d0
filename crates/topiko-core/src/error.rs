//! Error types for Topiko.

use thiserror::Error;

use crate::host::HostError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{0} branch not found")]
    BaseBranchNotFound(String),

    #[error("failed to {action}: {source}")]
    UpstreamLookup {
        action: &'static str,
        #[source]
        source: HostError,
    },

    #[error("failed to {action}: {source}")]
    UpstreamWrite {
        action: &'static str,
        #[source]
        source: HostError,
    },

    #[error("token permission error: {0}")]
    Permission(HostError),

    #[error("branch protection prevents direct write to {branch}: {source}")]
    ProtectedBranch {
        branch: String,
        #[source]
        source: HostError,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid file content: {0}")]
    InvalidContent(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
