use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialog::AccountFailure;

/// Outcome of a single dispatch call.
///
/// `message` carries the rendered text whenever rendering succeeded, even if
/// delivery failed, so the caller can log what would have been sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptResult {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    /// Account that delivered the message.
    pub account: Option<String>,
    /// Per-account failures collected before success (or before giving up).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AccountFailure>,
    pub timestamp: DateTime<Utc>,
}

impl ScriptResult {
    pub fn delivered(message: String, account: &str, failures: Vec<AccountFailure>) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
            account: Some(account.to_string()),
            failures,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(message: Option<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message,
            error: Some(error.into()),
            account: None,
            failures: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_failures(mut self, failures: Vec<AccountFailure>) -> Self {
        self.failures = failures;
        self
    }
}
