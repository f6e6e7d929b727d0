//! Configuration for the Topiko publishing gateway.
//!
//! Settings come from an optional KDL file, overridden by environment
//! variables. Credentials are only ever read from the environment.

pub mod error;
pub mod gateway;

pub use error::{ConfigError, ConfigResult};
pub use gateway::{BranchSettings, FileConfig, GatewayConfig, GitHubSettings, parse_config_file};
