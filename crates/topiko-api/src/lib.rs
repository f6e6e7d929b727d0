//! HTTP publishing gateway for Topiko.
//!
//! Each gateway instance serves a single endpoint (`/api/preview` or
//! `/api/publish`) and commits validated site configurations to GitHub.

pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;
