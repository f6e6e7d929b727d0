//! Site configuration serialization.
//!
//! Site configurations are committed as 2-space indented JSON and shipped to
//! the host base64 encoded over their UTF-8 bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::{Error, Result};

/// A site configuration ready to be written to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedConfig {
    /// Pretty-printed JSON text.
    pub json: String,
    /// Base64 encoding of `json`.
    pub base64: String,
}

/// Render a value as 2-space indented JSON, preserving object key order.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Encode text for transport in a host API request body.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode base64 file content as returned by a host.
///
/// Hosts may wrap encoded content across lines, so ASCII whitespace is
/// ignored.
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Error::InvalidContent(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidContent(e.to_string()))
}

/// Serialize a site configuration into its committed and transport forms.
pub fn serialize_site_config(site_config: &Value) -> Result<EncodedConfig> {
    let json = to_pretty_json(site_config)?;
    let base64 = encode_content(&json);
    Ok(EncodedConfig { json, base64 })
}
