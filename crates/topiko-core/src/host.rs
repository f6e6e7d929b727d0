//! Repository host abstraction.
//!
//! A repository host is the version-control provider that stores site
//! configurations (GitHub in production). The publisher only needs four
//! primitive operations: look up a branch, create a branch, read a file's
//! version token and create-or-update a file.

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The current tip of a named branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Short branch name (no `refs/heads/` prefix).
    pub name: String,
    /// Commit sha the branch points at.
    pub head_commit_sha: String,
}

/// Opaque revision marker of a file blob on a branch.
///
/// Required by the host to overwrite an existing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct FileVersionToken(String);

impl FileVersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A create-or-update write of a single file.
#[derive(Debug, Clone)]
pub struct PutFileRequest {
    /// Repository-relative path of the file.
    pub path: String,
    /// Branch to commit on.
    pub branch: String,
    /// File content, base64 encoded.
    pub content: String,
    /// Commit message.
    pub message: String,
    /// Version token of the file being replaced, if it exists.
    pub version: Option<FileVersionToken>,
}

/// Result of a successful file write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutFileOutcome {
    /// Sha of the commit the write produced, when the host reports it.
    pub commit_sha: Option<String>,
}

/// Failure reported by a repository host.
#[derive(Debug, Clone, Error)]
#[error("{}", self.describe())]
pub struct HostError {
    /// HTTP status, absent for transport failures.
    pub status: Option<u16>,
    /// Free-text message from the host (or the transport error).
    pub message: String,
    /// Permissions the host says the operation requires.
    pub accepted_permissions: Option<String>,
    /// Documentation link attached to the error by the host.
    pub documentation_url: Option<String>,
}

impl HostError {
    /// An error response returned by the host API.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            accepted_permissions: None,
            documentation_url: None,
        }
    }

    /// A request that never produced a response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            accepted_permissions: None,
            documentation_url: None,
        }
    }

    pub fn with_accepted_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.accepted_permissions = Some(permissions.into());
        self
    }

    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    fn describe(&self) -> String {
        match self.status {
            Some(status) => format!("{} - {}", status, self.message),
            None => self.message.clone(),
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Trait for version-control hosting providers.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Provider name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Look up a branch. `Ok(None)` when it does not exist.
    async fn get_branch(&self, name: &str) -> HostResult<Option<BranchRef>>;

    /// Create a branch pointing at `from_sha`.
    async fn create_branch(&self, name: &str, from_sha: &str) -> HostResult<BranchRef>;

    /// Read the version token of a file. `Ok(None)` when the file does not exist.
    async fn file_version(&self, path: &str, branch: &str)
    -> HostResult<Option<FileVersionToken>>;

    /// Create or overwrite a file with a single commit.
    async fn put_file(&self, request: PutFileRequest) -> HostResult<PutFileOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        let err = HostError::api(409, "sha does not match");
        assert_eq!(err.to_string(), "409 - sha does not match");

        let err = HostError::transport("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert!(!err.is_not_found());
    }
}
