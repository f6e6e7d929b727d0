//! GitHub API client for branch and file operations.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use topiko_config::GitHubSettings;
use topiko_core::host::{HostResult, PutFileOutcome, PutFileRequest};
use topiko_core::{BranchRef, FileVersionToken, HostError, RepositoryHost, Secret};
use tracing::{debug, warn};

const ACCEPTED_PERMISSIONS_HEADER: &str = "x-accepted-github-permissions";

/// GitHub repository host.
pub struct GitHubHost {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: Secret,
    user_agent: String,
}

impl GitHubHost {
    pub fn new(settings: &GitHubSettings, user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: settings.api_url.as_str().trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            token: settings.token.clone(),
            user_agent: user_agent.into(),
        }
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, suffix
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token.expose()))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/vnd.github+json")
    }
}

/// Percent-encode each segment of a slash-separated path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn transport_error(err: reqwest::Error) -> HostError {
    HostError::transport(format!("request failed: {}", err))
}

/// Turn a non-success response into a `HostError`.
async fn api_error(response: Response) -> HostError {
    let status = response.status().as_u16();
    let accepted_permissions = response
        .headers()
        .get(ACCEPTED_PERMISSIONS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let text = response.text().await.unwrap_or_default();

    let mut err = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => {
            let err = HostError::api(status, body.message);
            match body.documentation_url {
                Some(url) => err.with_documentation_url(url),
                None => err,
            }
        }
        Err(_) => HostError::api(status, text),
    };
    if let Some(permissions) = accepted_permissions {
        err = err.with_accepted_permissions(permissions);
    }
    err
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_branch(&self, name: &str) -> HostResult<Option<BranchRef>> {
        let url = self.repo_url(&format!("git/ref/heads/{}", encode_path(name)));

        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(branch = %name, "Branch not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let git_ref: GitRef = response
            .json()
            .await
            .map_err(|e| HostError::transport(format!("invalid ref response: {}", e)))?;

        Ok(Some(BranchRef {
            name: name.to_string(),
            head_commit_sha: git_ref.object.sha,
        }))
    }

    async fn create_branch(&self, name: &str, from_sha: &str) -> HostResult<BranchRef> {
        let url = self.repo_url("git/refs");
        let payload = CreateRef {
            git_ref: format!("refs/heads/{}", name),
            sha: from_sha.to_string(),
        };

        let response = self
            .request(Method::POST, &url)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

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
        let url = self.repo_url(&format!("contents/{}", encode_path(path)));

        let response = self
            .request(Method::GET, &url)
            .query(&[("ref", branch)])
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let file: ContentFile = response
            .json()
            .await
            .map_err(|e| HostError::transport(format!("invalid contents response: {}", e)))?;

        Ok(Some(FileVersionToken::new(file.sha)))
    }

    async fn put_file(&self, request: PutFileRequest) -> HostResult<PutFileOutcome> {
        let url = self.repo_url(&format!("contents/{}", encode_path(&request.path)));
        let payload = PutContents {
            message: request.message,
            content: request.content,
            branch: request.branch,
            sha: request.version.map(|v| v.as_str().to_string()),
        };

        let response = self
            .request(Method::PUT, &url)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        // The write has happened at this point; a body we cannot read only
        // costs us the commit sha.
        let commit_sha = match response.json::<PutContentsResponse>().await {
            Ok(body) => body.commit.and_then(|c| c.sha),
            Err(e) => {
                warn!(path = %request.path, error = %e, "Unreadable contents response");
                None
            }
        };

        Ok(PutFileOutcome { commit_sha })
    }
}

/// Error body returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    documentation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CreateRef {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents {
    message: String,
    content: String,
    branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    commit: Option<CommitInfo>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: Option<String>,
}
