//! Branch resolution.

use topiko_core::{BranchRef, Error, RepositoryHost, Result};
use tracing::{debug, info};

/// Make sure `branch` exists, creating it from `default_branch` if needed.
///
/// An existing branch is returned untouched. There is no lock around the
/// check-then-create; a concurrent creation surfaces as a host error.
pub async fn ensure_branch(
    host: &dyn RepositoryHost,
    branch: &str,
    default_branch: &str,
) -> Result<BranchRef> {
    let existing = host
        .get_branch(branch)
        .await
        .map_err(|source| Error::UpstreamLookup {
            action: "look up branch",
            source,
        })?;

    if let Some(existing) = existing {
        debug!(branch = %branch, head = %existing.head_commit_sha, "Branch already exists");
        return Ok(existing);
    }

    let base = host
        .get_branch(default_branch)
        .await
        .map_err(|source| Error::UpstreamLookup {
            action: "look up default branch",
            source,
        })?
        .ok_or_else(|| Error::BaseBranchNotFound(default_branch.to_string()))?;

    info!(
        branch = %branch,
        base = %default_branch,
        from_sha = %base.head_commit_sha,
        "Creating branch"
    );

    host.create_branch(branch, &base.head_commit_sha)
        .await
        .map_err(|source| Error::UpstreamWrite {
            action: "create branch",
            source,
        })
}
