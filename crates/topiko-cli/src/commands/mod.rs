//! CLI command implementations.

pub mod publish;
pub mod sections;

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Read a site configuration file as JSON.
pub fn read_site_config(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse site configuration: {}", path.display()))
}
