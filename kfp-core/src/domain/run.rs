//! Run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Handle to a run created on the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: String,
}

impl RunHandle {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.run_id)
    }
}

/// Run state as reported by the service
///
/// Only the terminal states are modelled explicitly. Everything else the
/// service reports (`RUNNING`, `PENDING`, `RUNTIME_STATE_UNSPECIFIED`, ...)
/// is kept verbatim in [`RunStatus::Active`] and treated as still running.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Succeeded,
    Skipped,
    Failed,
    Canceling,
    Canceled,
    Paused,
    Active(String),
}

impl RunStatus {
    /// Classify a raw state string
    pub fn from_state(state: &str) -> Self {
        match state {
            "SUCCEEDED" => Self::Succeeded,
            "SKIPPED" => Self::Skipped,
            "FAILED" => Self::Failed,
            "CANCELING" => Self::Canceling,
            "CANCELED" => Self::Canceled,
            "PAUSED" => Self::Paused,
            other => Self::Active(other.to_string()),
        }
    }

    /// The state string exactly as the service spells it
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAILED",
            Self::Canceling => "CANCELING",
            Self::Canceled => "CANCELED",
            Self::Paused => "PAUSED",
            Self::Active(state) => state.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Terminal, but not a success
    ///
    /// `CANCELING` and `PAUSED` count here: once the service reports them the
    /// run will not reach `SUCCEEDED` without outside intervention.
    pub fn is_failure(&self) -> bool {
        self.is_terminal() && !self.is_success()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RunStatus {
    fn from(state: &str) -> Self {
        Self::from_state(state)
    }
}

impl From<String> for RunStatus {
    fn from(state: String) -> Self {
        Self::from_state(&state)
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One observation of a run
///
/// `status` is the only field the state machine relies on. The rest is read
/// leniently from the same response for reporting and may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub run_id: Option<String>,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl RunSnapshot {
    /// Snapshot carrying only a status
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            run_id: None,
            display_name: None,
            created_at: None,
            finished_at: None,
            error_message: None,
        }
    }

    /// Build a snapshot from an already classified status and the raw run body
    pub fn from_response(status: RunStatus, body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        let timestamp = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
        };

        let error_message = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Self {
            status,
            run_id: text("run_id"),
            display_name: text("display_name"),
            created_at: timestamp("created_at"),
            finished_at: timestamp("finished_at"),
            error_message,
        }
    }
}
