//! GitHub client tests against a stand-in REST API.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use topiko_api::services::github::GitHubHost;
use topiko_api::{AppState, routes};
use topiko_config::{BranchSettings, GitHubSettings};
use topiko_core::host::PutFileRequest;
use topiko_core::{FileVersionToken, PublishTarget, RepositoryHost, Secret};
use topiko_publisher::SitePublisher;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn host(server: &MockServer) -> GitHubHost {
    let settings = GitHubSettings {
        owner: "topiko".to_string(),
        repo: "sites".to_string(),
        api_url: Url::parse(&server.uri()).unwrap(),
        token: Secret::new("ghp_test"),
    };
    GitHubHost::new(&settings, "topiko-test-gateway")
}

fn put_request(version: Option<&str>) -> PutFileRequest {
    PutFileRequest {
        path: "data/sites/acme/siteConfig.json".to_string(),
        branch: "main".to_string(),
        content: "e30=".to_string(),
        message: "Publish for acme".to_string(),
        version: version.map(FileVersionToken::new),
    }
}

#[tokio::test]
async fn get_branch_returns_head_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/topiko/sites/git/ref/heads/main"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("user-agent", "topiko-test-gateway"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "node_id": "REF_1",
            "object": { "sha": "abc123", "type": "commit" }
        })))
        .mount(&server)
        .await;

    let branch = host(&server).await.get_branch("main").await.unwrap().unwrap();
    assert_eq!(branch.name, "main");
    assert_eq!(branch.head_commit_sha, "abc123");
}

#[tokio::test]
async fn missing_branch_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/topiko/sites/git/ref/heads/preview-acme"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let branch = host(&server).await.get_branch("preview-acme").await.unwrap();
    assert!(branch.is_none());
}

#[tokio::test]
async fn create_branch_posts_full_ref() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/topiko/sites/git/refs"))
        .and(body_json(json!({
            "ref": "refs/heads/preview-acme",
            "sha": "abc123"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/preview-acme",
            "object": { "sha": "abc123" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let branch = host(&server)
        .await
        .create_branch("preview-acme", "abc123")
        .await
        .unwrap();
    assert_eq!(branch.head_commit_sha, "abc123");
}

#[tokio::test]
async fn file_version_reads_blob_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .and(query_param("ref", "preview-acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "siteConfig.json",
            "path": "data/sites/acme/siteConfig.json",
            "sha": "blob789",
            "type": "file",
            "encoding": "base64",
            "content": "e30=\n"
        })))
        .mount(&server)
        .await;

    let version = host(&server)
        .await
        .file_version("data/sites/acme/siteConfig.json", "preview-acme")
        .await
        .unwrap();
    assert_eq!(version, Some(FileVersionToken::new("blob789")));
}

#[tokio::test]
async fn file_version_missing_file_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest/repos/contents#get-repository-content"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let version = host(&server)
        .await
        .file_version("data/sites/acme/siteConfig.json", "main")
        .await
        .unwrap();
    assert_eq!(version, None);
}

#[tokio::test]
async fn file_version_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = host(&server)
        .await
        .file_version("data/sites/acme/siteConfig.json", "main")
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(500));
    assert_eq!(err.message, "upstream exploded");
}

#[tokio::test]
async fn put_file_sends_sha_only_when_known() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .and(body_json(json!({
            "message": "Publish for acme",
            "content": "e30=",
            "branch": "main"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": { "sha": "blob1" },
            "commit": { "sha": "commit1" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .and(body_json(json!({
            "message": "Publish for acme",
            "content": "e30=",
            "branch": "main",
            "sha": "blob0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": { "sha": "blob2" },
            "commit": { "sha": "commit2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = host(&server).await;
    let created = client.put_file(put_request(None)).await.unwrap();
    assert_eq!(created.commit_sha.as_deref(), Some("commit1"));

    let updated = client.put_file(put_request(Some("blob0"))).await.unwrap();
    assert_eq!(updated.commit_sha.as_deref(), Some("commit2"));
}

#[tokio::test]
async fn put_file_without_commit_in_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": null })))
        .mount(&server)
        .await;

    let outcome = host(&server).await.put_file(put_request(None)).await.unwrap();
    assert_eq!(outcome.commit_sha, None);
}

#[tokio::test]
async fn put_file_forbidden_keeps_structured_signals() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-accepted-github-permissions", "contents=write")
                .set_body_json(json!({
                    "message": "Resource not accessible by integration",
                    "documentation_url": "https://docs.github.com/rest/repos/contents"
                })),
        )
        .mount(&server)
        .await;

    let err = host(&server)
        .await
        .put_file(put_request(None))
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(403));
    assert_eq!(err.message, "Resource not accessible by integration");
    assert_eq!(err.accepted_permissions.as_deref(), Some("contents=write"));
    assert_eq!(
        err.documentation_url.as_deref(),
        Some("https://docs.github.com/rest/repos/contents")
    );
}

#[tokio::test]
async fn protected_branch_with_permissions_header_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/topiko/sites/contents/data/sites/acme/siteConfig.json"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-accepted-github-permissions", "contents=write")
                .set_body_json(json!({
                    "message": "Protected branch update failed for refs/heads/main."
                })),
        )
        .mount(&server)
        .await;

    let publisher = SitePublisher::new(Arc::new(host(&server).await), BranchSettings::default());
    let app = routes::router(AppState::new(
        PublishTarget::Production,
        Secret::new("s3cret"),
        publisher,
    ));
    let request = Request::builder()
        .method("POST")
        .uri("/api/publish")
        .header("content-type", "application/json")
        .header("x-topiko-secret", "s3cret")
        .body(Body::from(
            json!({ "siteId": "acme", "siteConfig": { "theme": "salon" } }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({
            "error": "GitHub API error",
            "details": "Branch protection prevents direct write to main branch"
        })
    );
}
