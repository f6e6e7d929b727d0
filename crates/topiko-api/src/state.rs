//! Application state.

use std::sync::Arc;
use topiko_config::GatewayConfig;
use topiko_core::{PublishTarget, RepositoryHost, Secret};
use topiko_publisher::SitePublisher;

use crate::services::github::GitHubHost;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Which endpoint this instance serves.
    pub target: PublishTarget,
    pub shared_secret: Secret,
    pub publisher: SitePublisher,
}

impl AppState {
    pub fn new(target: PublishTarget, shared_secret: Secret, publisher: SitePublisher) -> Self {
        Self {
            target,
            shared_secret,
            publisher,
        }
    }

    /// Build state backed by the GitHub repository named in `config`.
    pub fn from_config(target: PublishTarget, config: &GatewayConfig) -> Self {
        let user_agent = format!("topiko-{}-gateway", target.as_str());
        let host: Arc<dyn RepositoryHost> = Arc::new(GitHubHost::new(&config.github, user_agent));
        let publisher = SitePublisher::new(host, config.branches.clone());
        Self::new(target, config.shared_secret.clone(), publisher)
    }
}
