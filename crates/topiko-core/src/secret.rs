//! Shared-secret values.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// A credential that must never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the raw value (for outgoing headers).
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare a presented credential against this secret.
    ///
    /// Both sides are run through HMAC-SHA256 so the comparison time does
    /// not depend on where the first differing byte is.
    pub fn matches(&self, candidate: &str) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(self.0.as_bytes()) else {
            return false;
        };
        mac.update(self.0.as_bytes());
        let expected = mac.finalize().into_bytes();

        let Ok(mut mac) = HmacSha256::new_from_slice(self.0.as_bytes()) else {
            return false;
        };
        mac.update(candidate.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}
