//! Gateway configuration.
//!
//! ```kdl
//! server listen="0.0.0.0:8787"
//! github owner="topiko" repo="sites" api-url="https://api.github.com"
//! branches default="main" preview-prefix="preview-"
//! ```

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use std::net::SocketAddr;
use std::path::Path;
use topiko_core::{Secret, SiteId};
use tracing::debug;
use url::Url;

const DEFAULT_LISTEN: &str = "0.0.0.0:8787";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_PREVIEW_PREFIX: &str = "preview-";

/// Settings as written in a configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub listen: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub api_url: Option<String>,
    pub default_branch: Option<String>,
    pub preview_prefix: Option<String>,
}

/// Parse a configuration file from KDL text.
pub fn parse_config_file(kdl: &str) -> ConfigResult<FileConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut config = FileConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "server" => {
                config.listen = get_string_prop(node, "listen");
            }
            "github" => {
                config.owner = get_string_prop(node, "owner");
                config.repo = get_string_prop(node, "repo");
                config.api_url = get_string_prop(node, "api-url");
            }
            "branches" => {
                config.default_branch = get_string_prop(node, "default");
                config.preview_prefix = get_string_prop(node, "preview-prefix");
            }
            other => debug!(node = %other, "Ignoring unknown configuration node"),
        }
    }

    Ok(config)
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

/// Repository the gateway commits to.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub owner: String,
    pub repo: String,
    pub api_url: Url,
    pub token: Secret,
}

/// Branch naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSettings {
    /// The production branch.
    pub default: String,
    /// Prefix of per-site preview branches.
    pub preview_prefix: String,
}

impl BranchSettings {
    pub fn preview_branch(&self, site_id: &SiteId) -> String {
        format!("{}{}", self.preview_prefix, site_id)
    }
}

impl Default for BranchSettings {
    fn default() -> Self {
        Self {
            default: DEFAULT_BRANCH.to_string(),
            preview_prefix: DEFAULT_PREVIEW_PREFIX.to_string(),
        }
    }
}

/// Fully resolved gateway configuration. Built once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen: SocketAddr,
    pub github: GitHubSettings,
    pub branches: BranchSettings,
    /// Value callers must present in `x-topiko-secret`.
    pub shared_secret: Secret,
}

impl GatewayConfig {
    /// Load configuration from an optional KDL file and the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                parse_config_file(&text)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge file settings with environment lookups.
    ///
    /// Environment values win over file values.
    pub fn resolve<F>(file: FileConfig, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|v| !v.is_empty());

        let listen_raw = lookup("TOPIKO_LISTEN")
            .or(file.listen)
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "listen".to_string(),
                message: format!("{}: {}", listen_raw, e),
            })?;

        let owner = lookup("GITHUB_OWNER")
            .or(file.owner)
            .ok_or_else(|| ConfigError::MissingField("GITHUB_OWNER".to_string()))?;
        let repo = lookup("GITHUB_REPO")
            .or(file.repo)
            .ok_or_else(|| ConfigError::MissingField("GITHUB_REPO".to_string()))?;

        let api_url_raw = lookup("GITHUB_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url_raw).map_err(|e| ConfigError::InvalidValue {
            field: "api-url".to_string(),
            message: format!("{}: {}", api_url_raw, e),
        })?;

        let token = lookup("GITHUB_TOKEN")
            .map(Secret::new)
            .ok_or_else(|| ConfigError::MissingField("GITHUB_TOKEN".to_string()))?;
        let shared_secret = lookup("PREVIEW_SECRET")
            .map(Secret::new)
            .ok_or_else(|| ConfigError::MissingField("PREVIEW_SECRET".to_string()))?;

        let defaults = BranchSettings::default();
        let branches = BranchSettings {
            default: file.default_branch.unwrap_or(defaults.default),
            preview_prefix: file.preview_prefix.unwrap_or(defaults.preview_prefix),
        };

        Ok(Self {
            listen,
            github: GitHubSettings {
                owner,
                repo,
                api_url,
                token,
            },
            branches,
            shared_secret,
        })
    }
}
