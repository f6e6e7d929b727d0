//! In-memory repository host for deterministic testing.
//!
//! `MockHost` keeps branches and files in memory, enforces version tokens on
//! overwrite the way GitHub does, records every call and can be configured
//! to fail a given operation.
//!
//! ```
//! use topiko_publisher::mock::MockHost;
//!
//! let host = MockHost::new()
//!     .with_branch("main", "abc123")
//!     .with_file("main", "data/sites/acme/siteConfig.json", "{}");
//! assert_eq!(host.branch_head("main").as_deref(), Some("abc123"));
//! assert!(host.file_token("main", "data/sites/acme/siteConfig.json").is_some());
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use topiko_core::host::{HostResult, PutFileOutcome, PutFileRequest};
use topiko_core::serializer::{decode_content, encode_content};
use topiko_core::{BranchRef, FileVersionToken, HostError, RepositoryHost};

/// Mock repository host.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    inner: Arc<Mutex<MockHostInner>>,
}

#[derive(Debug, Default)]
struct MockHostInner {
    /// Branch name -> head commit sha.
    branches: HashMap<String, String>,
    /// (branch, path) -> stored file.
    files: HashMap<(String, String), StoredFile>,
    next_id: u64,
    fail_on: Option<FailOn>,
    omit_commit_sha: bool,
    stale_reads: bool,
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    version: String,
    /// Base64 content as written.
    content: String,
}

/// Which operation should fail, and how.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetBranch(HostError),
    CreateBranch(HostError),
    FileVersion(HostError),
    PutFile(HostError),
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetBranch {
        name: String,
    },
    CreateBranch {
        name: String,
        from_sha: String,
    },
    FileVersion {
        path: String,
        branch: String,
    },
    PutFile {
        path: String,
        branch: String,
        message: String,
        version: Option<String>,
    },
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch pointing at `head_sha`.
    pub fn with_branch(self, name: &str, head_sha: &str) -> Self {
        self.state()
            .branches
            .insert(name.to_string(), head_sha.to_string());
        self
    }

    /// Add an existing file with plain-text `content`.
    pub fn with_file(self, branch: &str, path: &str, content: &str) -> Self {
        {
            let mut inner = self.state();
            let version = inner.next_sha("blob");
            inner.files.insert(
                (branch.to_string(), path.to_string()),
                StoredFile {
                    version,
                    content: encode_content(content),
                },
            );
        }
        self
    }

    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    /// Report successful writes without a commit sha.
    pub fn without_commit_sha(self) -> Self {
        self.state().omit_commit_sha = true;
        self
    }

    /// Hand out outdated version tokens, as if another writer committed
    /// between the read and the write.
    pub fn with_stale_reads(self) -> Self {
        self.state().stale_reads = true;
        self
    }

    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    pub fn branch_head(&self, name: &str) -> Option<String> {
        self.state().branches.get(name).cloned()
    }

    /// Current version token of a file.
    pub fn file_token(&self, branch: &str, path: &str) -> Option<String> {
        self.state()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|f| f.version.clone())
    }

    /// Decoded content of a file.
    pub fn file_content(&self, branch: &str, path: &str) -> Option<String> {
        self.state()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .and_then(|f| decode_content(&f.content).ok())
    }

    fn state(&self) -> MutexGuard<'_, MockHostInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MockHostInner {
    fn next_sha(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", kind, self.next_id)
    }
}

#[async_trait]
impl RepositoryHost for MockHost {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_branch(&self, name: &str) -> HostResult<Option<BranchRef>> {
        let mut inner = self.state();
        inner.operations.push(MockOperation::GetBranch {
            name: name.to_string(),
        });
        if let Some(FailOn::GetBranch(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        Ok(inner.branches.get(name).map(|sha| BranchRef {
            name: name.to_string(),
            head_commit_sha: sha.clone(),
        }))
    }

    async fn create_branch(&self, name: &str, from_sha: &str) -> HostResult<BranchRef> {
        let mut inner = self.state();
        inner.operations.push(MockOperation::CreateBranch {
            name: name.to_string(),
            from_sha: from_sha.to_string(),
        });
        if let Some(FailOn::CreateBranch(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        if inner.branches.contains_key(name) {
            return Err(HostError::api(422, "Reference already exists"));
        }
        inner
            .branches
            .insert(name.to_string(), from_sha.to_string());
        Ok(BranchRef {
            name: name.to_string(),
            head_commit_sha: from_sha.to_string(),
        })
    }

    async fn file_version(
        &self,
        path: &str,
        branch: &str,
    ) -> HostResult<Option<FileVersionToken>> {
        let mut inner = self.state();
        inner.operations.push(MockOperation::FileVersion {
            path: path.to_string(),
            branch: branch.to_string(),
        });
        if let Some(FailOn::FileVersion(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        let stale = inner.stale_reads;
        Ok(inner
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|f| {
                if stale {
                    FileVersionToken::new(format!("{}-stale", f.version))
                } else {
                    FileVersionToken::new(f.version.clone())
                }
            }))
    }

    async fn put_file(&self, request: PutFileRequest) -> HostResult<PutFileOutcome> {
        let mut inner = self.state();
        inner.operations.push(MockOperation::PutFile {
            path: request.path.clone(),
            branch: request.branch.clone(),
            message: request.message.clone(),
            version: request.version.as_ref().map(|v| v.as_str().to_string()),
        });
        if let Some(FailOn::PutFile(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        if !inner.branches.contains_key(&request.branch) {
            return Err(HostError::api(404, format!("Branch {} not found", request.branch)));
        }

        let key = (request.branch.clone(), request.path.clone());
        match (inner.files.get(&key), &request.version) {
            (Some(_), None) => {
                return Err(HostError::api(422, "\"sha\" wasn't supplied."));
            }
            (Some(existing), Some(version)) if existing.version != version.as_str() => {
                return Err(HostError::api(
                    409,
                    format!("{} does not match {}", request.path, version),
                ));
            }
            _ => {}
        }

        let version = inner.next_sha("blob");
        let commit = inner.next_sha("commit");
        inner.files.insert(
            key,
            StoredFile {
                version,
                content: request.content,
            },
        );
        inner.branches.insert(request.branch, commit.clone());

        Ok(PutFileOutcome {
            commit_sha: (!inner.omit_commit_sha).then_some(commit),
        })
    }
}
