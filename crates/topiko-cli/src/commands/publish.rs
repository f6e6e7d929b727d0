//! Preview and publish commands.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use std::path::Path;
use topiko_core::PublishTarget;
use tracing::debug;
use url::Url;

const SECRET_HEADER: &str = "x-topiko-secret";

/// Send a site configuration to the gateway endpoint for `target`.
pub async fn run(
    gateway_url: &str,
    secret: Option<&str>,
    target: PublishTarget,
    site_id: &str,
    config_path: &Path,
    message: Option<String>,
) -> Result<()> {
    let site_config = super::read_site_config(config_path)?;
    let body = request_body(site_id, site_config, message)?;
    let url = endpoint_url(gateway_url, target)?;

    debug!(url = %url, site_id = %site_id, "Sending {} request", target.as_str());

    let mut request = reqwest::Client::new().post(url.clone()).json(&body);
    if let Some(secret) = secret {
        request = request.header(SECRET_HEADER, secret);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to reach gateway at {}", url))?;
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if !status.is_success() {
        bail!("{} failed ({}): {}", target.as_str(), status, text);
    }

    let result: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    print_result(&result);
    Ok(())
}

fn endpoint_url(gateway_url: &str, target: PublishTarget) -> Result<Url> {
    let base = Url::parse(gateway_url)
        .with_context(|| format!("Invalid gateway URL: {}", gateway_url))?;
    Ok(base.join(target.endpoint())?)
}

fn request_body(site_id: &str, site_config: Value, message: Option<String>) -> Result<Value> {
    if !site_config.is_object() {
        bail!("Site configuration must be a JSON object");
    }

    let mut body = Map::new();
    body.insert("siteId".to_string(), json!(site_id));
    body.insert("siteConfig".to_string(), site_config);
    if let Some(message) = message {
        body.insert("publishMessage".to_string(), json!(message));
    }
    Ok(Value::Object(body))
}

fn print_result(result: &Value) {
    match result.as_object() {
        Some(fields) => {
            for key in ["status", "branch", "filePath", "commitSha"] {
                if let Some(value) = fields.get(key).and_then(Value::as_str) {
                    println!("{:<10} {}", key, value);
                }
            }
        }
        None => println!("{}", result),
    }
}
