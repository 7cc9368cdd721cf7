//! Error types for BulletProve.
//!
//! All fallible operations in the framework return [`Error`]. Errors raised by hooks are
//! wrapped in [`Error::HookFailed`] so a failing test reports which lifecycle phase and
//! which hook aborted the run.

pub mod config;

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use crate::error::config::ConfigError;

/// Main error type for the framework.
///
/// Aggregates framework errors and the external library errors that can surface while
/// building servers, dispatching requests, or running hooks. `#[from]` conversions allow
/// hook implementations to use `?` on database, JSON and HTTP errors directly.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// No configuration callback was registered for the requested server name.
    #[error("No test server registered under the name {0:?}")]
    ServerNotRegistered(String),
    /// The server configuration callback produced an unusable server.
    #[error("Failed to configure test server {name:?}: {reason}")]
    ServerConfiguration { name: String, reason: String },
    /// A required service was not present in the container.
    #[error("No service registered for type {0}")]
    ServiceNotRegistered(&'static str),
    /// A lifecycle hook failed; remaining hooks of the phase were not run.
    #[error("{phase} hook {hook} failed: {source}")]
    HookFailed {
        phase: &'static str,
        hook: &'static str,
        #[source]
        source: Box<Error>,
    },
    /// The server emitted log events that no filter accepted.
    #[error("{count} unexpected log event(s) captured from the server:\n{summary}")]
    UnexpectedLogs { count: usize, summary: String },
    /// No log event matched before the timeout elapsed.
    #[error("Timed out after {0:?} waiting for a matching log event")]
    LogTimeout(Duration),
    /// Response status did not match the expected status.
    #[error("Expected response status {expected} but got {actual}: {body}")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },
    /// Free-form error raised by user hooks or seeders.
    #[error("{0}")]
    Custom(String),
    /// Request could not be built (invalid method, uri or header).
    #[error(transparent)]
    Http(#[from] axum::http::Error),
    /// Response body could not be read.
    #[error(transparent)]
    Body(#[from] axum::Error),
    /// JSON (de)serialisation of a request or response body failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Database error raised by seeding or cleanup hooks.
    #[cfg(feature = "database")]
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
}

impl Error {
    /// Build an [`Error::Custom`] from any displayable message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}
