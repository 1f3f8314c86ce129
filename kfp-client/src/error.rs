//! Error types for the pipeline service client

use kfp_core::domain::run::RunStatus;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the pipeline service
///
/// Every variant carries enough context (operation, identifiers, observed
/// value) to diagnose a failed run without re-running it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or connection failure while issuing a request
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body returned by the service
        message: String,
    },

    /// Response body is not the expected JSON structure
    #[error("Failed to decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    /// No pipeline carries the requested display name
    #[error("Pipeline with display name '{0}' not found")]
    NotFound(String),

    /// A required response field is missing or has the wrong type
    #[error("Malformed {operation} response: field '{field}' missing or not a string")]
    MalformedResponse {
        operation: &'static str,
        field: &'static str,
    },

    /// Run reached a terminal state other than `SUCCEEDED`
    #[error("Pipeline run {run_id} failed with status: {state}{}", detail(.message))]
    RunFailed {
        run_id: String,
        state: RunStatus,
        /// Error message reported by the service, if any
        message: Option<String>,
    },

    /// Deadline elapsed before the run reached a terminal state
    #[error("Pipeline run {run_id} timed out after {timeout:?}")]
    TimedOut { run_id: String, timeout: Duration },

    /// Base URL cannot be combined with a resource path
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// Watch settings that cannot drive a poll loop
    #[error("Invalid watch configuration: {0}")]
    InvalidWatchConfig(&'static str),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn decode(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            operation,
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(operation: &'static str, field: &'static str) -> Self {
        Self::MalformedResponse { operation, field }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::Api { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }

    /// Check if the run itself failed, as opposed to the harness
    pub fn is_run_failure(&self) -> bool {
        matches!(self, Self::RunFailed { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}
