//! Preview and production publish flows.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use topiko_config::BranchSettings;
use topiko_core::serializer::serialize_site_config;
use topiko_core::{CommitResult, PublishRequest, PublishTarget, RepositoryHost, Result};
use tracing::info;

use crate::branch::ensure_branch;
use crate::classify::classify_write_error;
use crate::file::{LookupPolicy, PublishFile, publish_file};

/// Commits site configurations to a repository host.
#[derive(Clone)]
pub struct SitePublisher {
    host: Arc<dyn RepositoryHost>,
    branches: BranchSettings,
}

impl SitePublisher {
    pub fn new(host: Arc<dyn RepositoryHost>, branches: BranchSettings) -> Self {
        Self { host, branches }
    }

    /// Publish a site configuration to `target`.
    pub async fn publish(
        &self,
        target: PublishTarget,
        request: &PublishRequest,
    ) -> Result<CommitResult> {
        self.publish_at(target, request, Utc::now()).await
    }

    /// Publish with an explicit clock reading for the commit message.
    pub async fn publish_at(
        &self,
        target: PublishTarget,
        request: &PublishRequest,
        now: DateTime<Utc>,
    ) -> Result<CommitResult> {
        let file_path = request.site_id.config_path();
        let message =
            target.commit_message(&request.site_id, request.publish_message.as_deref(), now);
        let encoded = serialize_site_config(&request.site_config_value())?;

        let branch = match target {
            PublishTarget::Preview => {
                let branch = self.branches.preview_branch(&request.site_id);
                ensure_branch(self.host.as_ref(), &branch, &self.branches.default).await?;
                branch
            }
            PublishTarget::Production => self.branches.default.clone(),
        };

        info!(
            site_id = %request.site_id,
            flow = target.as_str(),
            branch = %branch,
            host = self.host.name(),
            "Publishing site configuration"
        );

        let file = PublishFile {
            path: file_path.clone(),
            branch: branch.clone(),
            content_base64: encoded.base64,
            message,
        };

        let commit_sha = match target {
            PublishTarget::Preview => {
                publish_file(self.host.as_ref(), file, LookupPolicy::BestEffort).await?
            }
            PublishTarget::Production => {
                publish_file(self.host.as_ref(), file, LookupPolicy::Strict)
                    .await
                    .map_err(|e| classify_write_error(e, &branch))?
            }
        };

        Ok(CommitResult {
            branch,
            commit_sha,
            file_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FailOn, MockHost, MockOperation};
    use chrono::TimeZone;
    use serde_json::json;
    use topiko_core::{Error, HostError};

    const PATH: &str = "data/sites/acme/siteConfig.json";

    fn request(target: PublishTarget, body: serde_json::Value) -> PublishRequest {
        PublishRequest::from_value(body, target).unwrap()
    }

    fn publisher(host: &MockHost) -> SitePublisher {
        SitePublisher::new(Arc::new(host.clone()), BranchSettings::default())
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
    }

    fn put_messages(host: &MockHost) -> Vec<String> {
        host.operations()
            .into_iter()
            .filter_map(|op| match op {
                MockOperation::PutFile { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_preview_creates_branch_then_writes() {
        let host = MockHost::new().with_branch("main", "sha-main");
        let req = request(
            PublishTarget::Preview,
            json!({ "siteId": "acme", "siteConfig": { "theme": "salon" } }),
        );

        let result = publisher(&host)
            .publish_at(PublishTarget::Preview, &req, fixed_now())
            .await
            .unwrap();

        assert_eq!(result.branch, "preview-acme");
        assert_eq!(result.file_path, PATH);
        assert!(!result.commit_sha.is_empty());

        let ops = host.operations();
        let create = ops
            .iter()
            .position(|op| matches!(op, MockOperation::CreateBranch { .. }))
            .unwrap();
        let put = ops
            .iter()
            .position(|op| matches!(op, MockOperation::PutFile { .. }))
            .unwrap();
        assert!(create < put);

        assert_eq!(
            host.file_content("preview-acme", PATH).as_deref(),
            Some("{\n  \"theme\": \"salon\"\n}")
        );
        assert_eq!(
            put_messages(&host),
            vec!["Preview update for acme (2025-03-04T05-06-07-000Z)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_preview_reuses_existing_branch() {
        let host = MockHost::new()
            .with_branch("main", "sha-main")
            .with_branch("preview-acme", "sha-preview")
            .with_file("preview-acme", PATH, "{}");
        let req = request(
            PublishTarget::Preview,
            json!({ "siteId": "acme", "siteConfig": { "theme": "salon" } }),
        );

        publisher(&host)
            .publish(PublishTarget::Preview, &req)
            .await
            .unwrap();

        assert!(
            !host
                .operations()
                .iter()
                .any(|op| matches!(op, MockOperation::CreateBranch { .. }))
        );
        assert_eq!(
            host.file_content("preview-acme", PATH).as_deref(),
            Some("{\n  \"theme\": \"salon\"\n}")
        );
    }

    #[tokio::test]
    async fn test_production_targets_default_branch() {
        let host = MockHost::new().with_branch("main", "sha-main");
        let req = request(
            PublishTarget::Production,
            json!({ "siteId": "preview-looking-id", "siteConfig": { "theme": "salon" } }),
        );

        let result = publisher(&host)
            .publish_at(PublishTarget::Production, &req, fixed_now())
            .await
            .unwrap();

        assert_eq!(result.branch, "main");
        assert_eq!(
            put_messages(&host),
            vec!["Publish for preview-looking-id at 2025-03-04T05-06-07-000Z".to_string()]
        );
        assert!(
            !host
                .operations()
                .iter()
                .any(|op| matches!(op, MockOperation::GetBranch { .. }))
        );
    }

    #[tokio::test]
    async fn test_production_uses_custom_message() {
        let host = MockHost::new().with_branch("main", "sha-main");
        let req = request(
            PublishTarget::Production,
            json!({ "siteId": "acme", "siteConfig": {}, "publishMessage": "Go live" }),
        );

        publisher(&host)
            .publish(PublishTarget::Production, &req)
            .await
            .unwrap();
        assert_eq!(put_messages(&host), vec!["Go live".to_string()]);
    }

    #[tokio::test]
    async fn test_production_classifies_protected_branch() {
        let host = MockHost::new()
            .with_branch("main", "sha-main")
            .fail_on(FailOn::PutFile(HostError::api(
                403,
                "Protected branch update failed for refs/heads/main.",
            )));
        let req = request(
            PublishTarget::Production,
            json!({ "siteId": "acme", "siteConfig": {} }),
        );

        let result = publisher(&host)
            .publish(PublishTarget::Production, &req)
            .await;
        assert!(matches!(result, Err(Error::ProtectedBranch { branch, .. }) if branch == "main"));
    }

    #[tokio::test]
    async fn test_preview_does_not_classify() {
        let host = MockHost::new()
            .with_branch("main", "sha-main")
            .fail_on(FailOn::PutFile(HostError::api(
                403,
                "Resource not accessible by integration",
            )));
        let req = request(
            PublishTarget::Preview,
            json!({ "siteId": "acme", "siteConfig": {} }),
        );

        let result = publisher(&host).publish(PublishTarget::Preview, &req).await;
        assert!(matches!(result, Err(Error::UpstreamWrite { .. })));
    }

    #[tokio::test]
    async fn test_stale_token_surfaces_as_write_failure() {
        let host = MockHost::new()
            .with_branch("main", "sha-main")
            .with_file("main", PATH, "{}")
            .with_stale_reads();
        let req = request(
            PublishTarget::Production,
            json!({ "siteId": "acme", "siteConfig": { "v": 2 } }),
        );

        let result = publisher(&host)
            .publish(PublishTarget::Production, &req)
            .await;
        match result {
            Err(Error::UpstreamWrite { source, .. }) => assert_eq!(source.status, Some(409)),
            other => panic!("expected write conflict, got {:?}", other),
        }
    }
}
