//! congregation-server: HTTP API for the congregation website
//!
//! Serves statistics and gallery content from a document store and
//! accepts contact form submissions.

pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use state::{AppState, ConfigPresence};
