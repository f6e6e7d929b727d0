//! Core domain types and traits for the Topiko publishing gateway.
//!
//! This crate contains:
//! - Site identifiers, publish requests and commit results
//! - The `RepositoryHost` trait implemented by version-control providers
//! - Site configuration serialization (pretty JSON + base64 transport)
//! - The static theme section registry
//! - Shared-secret handling

pub mod error;
pub mod host;
pub mod secret;
pub mod sections;
pub mod serializer;
pub mod site;

pub use error::{Error, Result};
pub use host::{BranchRef, FileVersionToken, HostError, RepositoryHost};
pub use secret::Secret;
pub use site::{CommitResult, PublishRequest, PublishTarget, SiteId};
