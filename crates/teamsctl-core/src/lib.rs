//! Core library for teamsctl - manage Microsoft Teams through Microsoft Graph.
//!
//! This crate provides:
//! - Configuration loading and management
//! - XDG-compliant path resolution
//! - Schema and example config generation
//! - A Graph client for teams, channels, groups, members and messages
//! - Common types and error handling

pub mod config;
pub mod error;
pub mod graph;
pub mod paths;
pub mod schema;

pub use config::{AppConfig, GraphConfig, LogLevel, LoggingConfig, RuntimeConfig};
pub use error::{CoreError, Result};
pub use graph::{GraphResponse, GraphService, HttpSender, RequestSender};
pub use paths::AppPaths;
pub use schema::{generate_example_config, generate_schema, write_generated_files};

/// Application name used for config directories and environment prefix.
pub const APP_NAME: &str = "teamsctl";

/// Repository URL, used as the base of the generated schema `$id`.
pub const REPO_URL: &str = "https://github.com/teamsctl/teamsctl";

/// Microsoft Graph v1.0 root.
pub const DEFAULT_GRAPH_ROOT: &str = "https://graph.microsoft.com/v1.0";

/// Returns the environment variable prefix for this application.
#[must_use]
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
