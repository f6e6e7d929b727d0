//! Site identifiers, publish requests and commit results.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Directory under which every site's configuration is committed.
pub const SITES_DIR: &str = "data/sites";

/// File name of a committed site configuration.
pub const SITE_CONFIG_FILE: &str = "siteConfig.json";

/// Identifier of a tenant site.
///
/// Used verbatim in branch names and file paths; callers are responsible
/// for keeping it path- and ref-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct SiteId(String);

impl SiteId {
    /// Create a site id, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::Validation("siteId must be a string".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Repository path of this site's configuration file.
    pub fn config_path(&self) -> String {
        format!("{}/{}/{}", SITES_DIR, self.0, SITE_CONFIG_FILE)
    }
}

/// Where a site configuration is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishTarget {
    /// Per-site staging branch.
    Preview,
    /// The repository's default branch.
    Production,
}

impl PublishTarget {
    /// Endpoint path served by the gateway for this target.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PublishTarget::Preview => "/api/preview",
            PublishTarget::Production => "/api/publish",
        }
    }

    /// Status reported to callers on success.
    pub fn success_status(&self) -> &'static str {
        match self {
            PublishTarget::Preview => "preview-triggered",
            PublishTarget::Production => "published",
        }
    }

    /// Short name used in logs and user agents.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishTarget::Preview => "preview",
            PublishTarget::Production => "publish",
        }
    }

    /// Commit message for a publish of `site_id` at `now`.
    ///
    /// A non-empty `custom` message wins for production publishes; preview
    /// commits always use the generated message.
    pub fn commit_message(
        &self,
        site_id: &SiteId,
        custom: Option<&str>,
        now: DateTime<Utc>,
    ) -> String {
        let timestamp = commit_timestamp(now);
        match self {
            PublishTarget::Preview => {
                format!("Preview update for {} ({})", site_id, timestamp)
            }
            PublishTarget::Production => match custom.filter(|m| !m.is_empty()) {
                Some(message) => message.to_string(),
                None => format!("Publish for {} at {}", site_id, timestamp),
            },
        }
    }
}

impl std::str::FromStr for PublishTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "preview" => Ok(PublishTarget::Preview),
            "publish" | "production" => Ok(PublishTarget::Production),
            other => Err(Error::Validation(format!("unknown publish target: {}", other))),
        }
    }
}

/// ISO-8601 UTC instant with `:` and `.` replaced by `-`.
pub fn commit_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// A validated request to publish a site configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub site_id: SiteId,
    pub site_config: Map<String, Value>,
    pub publish_message: Option<String>,
}

impl PublishRequest {
    /// Parse and validate a raw request body.
    pub fn parse(body: &[u8], target: PublishTarget) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| Error::Validation("Invalid JSON body".to_string()))?;
        Self::from_value(value, target)
    }

    /// Validate an already-parsed request body.
    ///
    /// `publishMessage` is only read for production publishes.
    pub fn from_value(mut value: Value, target: PublishTarget) -> Result<Self> {
        let site_id = match value.get("siteId") {
            Some(Value::String(id)) => SiteId::new(id.clone())?,
            _ => return Err(Error::Validation("siteId must be a string".to_string())),
        };

        let site_config = match value.get_mut("siteConfig").map(Value::take) {
            Some(Value::Object(config)) => config,
            _ => {
                return Err(Error::Validation(
                    "siteConfig must be an object".to_string(),
                ));
            }
        };

        let publish_message = match target {
            PublishTarget::Preview => None,
            PublishTarget::Production => match value.get("publishMessage") {
                None | Some(Value::Null) => None,
                Some(Value::String(message)) => Some(message.clone()),
                Some(_) => {
                    return Err(Error::Validation(
                        "publishMessage must be a string".to_string(),
                    ));
                }
            },
        };

        Ok(Self {
            site_id,
            site_config,
            publish_message,
        })
    }

    /// The site configuration as a JSON value.
    pub fn site_config_value(&self) -> Value {
        Value::Object(self.site_config.clone())
    }
}

/// Confirmation of a committed site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub branch: String,
    /// Empty when the host did not report the commit.
    pub commit_sha: String,
    pub file_path: String,
}
