//! Classification of host write failures on the production branch.
//!
//! GitHub reports both missing token scopes and branch protection as a
//! plain 403. Protection is checked first: a link to the branch protection
//! or ruleset docs, then the word "protected" in the message. Scope failures
//! are recognised by their message, and the `X-Accepted-GitHub-Permissions`
//! header only decides when nothing points at protection, since GitHub sends
//! it on most fine-grained token responses. The text matching is brittle
//! and only best-effort.

use topiko_core::{Error, HostError};

const FORBIDDEN: u16 = 403;

/// Refine an `UpstreamWrite` error into `Permission` or `ProtectedBranch`
/// where the host's response allows it. Other errors pass through.
pub fn classify_write_error(err: Error, branch: &str) -> Error {
    match err {
        Error::UpstreamWrite { action, source } if source.status == Some(FORBIDDEN) => {
            match classify_forbidden(&source) {
                Some(Forbidden::Permission) => Error::Permission(source),
                Some(Forbidden::ProtectedBranch) => Error::ProtectedBranch {
                    branch: branch.to_string(),
                    source,
                },
                None => Error::UpstreamWrite { action, source },
            }
        }
        other => other,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Forbidden {
    Permission,
    ProtectedBranch,
}

fn classify_forbidden(source: &HostError) -> Option<Forbidden> {
    if let Some(url) = &source.documentation_url {
        if url.contains("protected-branches") || url.contains("rulesets") {
            return Some(Forbidden::ProtectedBranch);
        }
    }

    let message = source.message.to_lowercase();
    if message.contains("protected") {
        Some(Forbidden::ProtectedBranch)
    } else if message.contains("resource not accessible") || source.accepted_permissions.is_some()
    {
        Some(Forbidden::Permission)
    } else {
        None
    }
}
