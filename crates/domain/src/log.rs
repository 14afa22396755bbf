//! `AutomationLog` — the immutable record of one top-level firing.

use serde::{Deserialize, Serialize};

use crate::id::{AutomationId, LogId};
use crate::time::{Timestamp, now};

/// Aggregate outcome of a firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log status `{other}`")),
        }
    }
}

/// Append-only entry written once per firing that passed trigger and
/// condition checks. `error` is present exactly when `status` is
/// [`LogStatus::Error`]; use [`AutomationLog::success`] and
/// [`AutomationLog::failure`] to keep that true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationLog {
    pub id: LogId,
    pub automation_id: AutomationId,
    pub timestamp: Timestamp,
    pub status: LogStatus,
    pub duration_ms: u64,
    /// Snapshot of the triggering event.
    pub input: serde_json::Value,
    /// Snapshot of the per-action results.
    pub output: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AutomationLog {
    #[must_use]
    pub fn success(
        automation_id: AutomationId,
        duration_ms: u64,
        input: serde_json::Value,
        output: serde_json::Value,
    ) -> Self {
        Self {
            id: LogId::new(),
            automation_id,
            timestamp: now(),
            status: LogStatus::Success,
            duration_ms,
            input,
            output,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(
        automation_id: AutomationId,
        duration_ms: u64,
        input: serde_json::Value,
        output: serde_json::Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: LogId::new(),
            automation_id,
            timestamp: now(),
            status: LogStatus::Error,
            duration_ms,
            input,
            output,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == LogStatus::Success
    }
}
