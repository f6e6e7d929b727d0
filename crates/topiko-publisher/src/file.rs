//! Single-file create-or-update.

use topiko_core::host::PutFileRequest;
use topiko_core::{Error, RepositoryHost, Result};
use tracing::{debug, info, warn};

/// How to treat a failed version-token lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPolicy {
    /// Abort the publish with `Error::UpstreamLookup`.
    Strict,
    /// Log the failure and write without a token.
    BestEffort,
}

/// A file to commit.
#[derive(Debug, Clone)]
pub struct PublishFile {
    pub path: String,
    pub branch: String,
    /// Base64-encoded content.
    pub content_base64: String,
    pub message: String,
}

/// Write `file` to its branch, overwriting any existing version.
///
/// Returns the sha of the resulting commit, or an empty string when the
/// host does not report one.
pub async fn publish_file(
    host: &dyn RepositoryHost,
    file: PublishFile,
    policy: LookupPolicy,
) -> Result<String> {
    let version = match host.file_version(&file.path, &file.branch).await {
        Ok(version) => version,
        Err(source) => match policy {
            LookupPolicy::Strict => {
                return Err(Error::UpstreamLookup {
                    action: "check file",
                    source,
                });
            }
            LookupPolicy::BestEffort => {
                warn!(
                    path = %file.path,
                    branch = %file.branch,
                    error = %source,
                    "Could not read file version, writing without it"
                );
                None
            }
        },
    };

    debug!(
        path = %file.path,
        branch = %file.branch,
        exists = version.is_some(),
        "Writing file"
    );

    let outcome = host
        .put_file(PutFileRequest {
            path: file.path.clone(),
            branch: file.branch.clone(),
            content: file.content_base64,
            message: file.message,
            version,
        })
        .await
        .map_err(|source| Error::UpstreamWrite {
            action: "update file",
            source,
        })?;

    let commit_sha = outcome.commit_sha.unwrap_or_default();
    info!(
        path = %file.path,
        branch = %file.branch,
        commit_sha = %commit_sha,
        "File committed"
    );
    Ok(commit_sha)
}
