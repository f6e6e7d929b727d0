//! Site configuration publishing for Topiko.
//!
//! Commits a site's configuration to its repository host, either on a
//! per-site preview branch (created on demand from the default branch) or
//! directly on the default branch.

pub mod branch;
pub mod classify;
pub mod file;
pub mod mock;
pub mod publisher;

pub use branch::ensure_branch;
pub use file::{LookupPolicy, PublishFile, publish_file};
pub use publisher::SitePublisher;
