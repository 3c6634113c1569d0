//! Notification types for the Courier event bus.
//!
//! `CourierEvent` is broadcast for every outcome worth showing to an attached
//! interface. All variants are Clone + Send + Sync for use with tokio
//! broadcast channels.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Events emitted by the template store, account registry, resolver, and
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CourierEvent {
    /// A template was added (`created = true`) or updated.
    TemplateSaved { name: String, created: bool },

    TemplateDeleted { name: String },

    /// The store was (re)loaded from disk.
    TemplatesReloaded {
        count: usize,
        /// True when a legacy document was upgraded during the load.
        migrated: bool,
    },

    /// The store document was unreadable and an empty set is in use.
    StoreDegraded { reason: String },

    AccountConnected { name: String },

    AccountDisconnected { name: String },

    AuthenticationFailed { name: String, reason: String },

    DialogFound { handle: String, account: String },

    DialogNotFound { handle: String, accounts_queried: usize },

    /// One account failed during a search or fallback dispatch.
    AccountScanFailed {
        account: String,
        kind: ErrorKind,
        error: String,
    },

    MessageDispatched { target: String, account: String },

    DispatchFailed { target: String, error: String },

    /// An operation was refused before doing any work.
    ValidationRejected { operation: String, reason: String },
}

impl CourierEvent {
    /// Human-readable one-liner for status bars and logs.
    pub fn summary(&self) -> String {
        match self {
            CourierEvent::TemplateSaved { name, created: true } => {
                format!("Template '{name}' added")
            }
            CourierEvent::TemplateSaved { name, created: false } => {
                format!("Template '{name}' updated")
            }
            CourierEvent::TemplateDeleted { name } => format!("Template '{name}' deleted"),
            CourierEvent::TemplatesReloaded { count, migrated } => {
                if *migrated {
                    format!("Loaded {count} templates (upgraded from legacy format)")
                } else {
                    format!("Loaded {count} templates")
                }
            }
            CourierEvent::StoreDegraded { reason } => {
                format!("Template store unreadable, starting empty: {reason}")
            }
            CourierEvent::AccountConnected { name } => format!("Account '{name}' connected"),
            CourierEvent::AccountDisconnected { name } => {
                format!("Account '{name}' disconnected")
            }
            CourierEvent::AuthenticationFailed { name, reason } => {
                format!("Authentication failed for '{name}': {reason}")
            }
            CourierEvent::DialogFound { handle, account } => {
                format!("Found @{handle} via '{account}'")
            }
            CourierEvent::DialogNotFound {
                handle,
                accounts_queried,
            } => format!("@{handle} not found in {accounts_queried} account(s)"),
            CourierEvent::AccountScanFailed { account, error, .. } => {
                format!("Account '{account}' failed: {error}")
            }
            CourierEvent::MessageDispatched { target, account } => {
                format!("Message sent to {target} via '{account}'")
            }
            CourierEvent::DispatchFailed { target, error } => {
                format!("Sending to {target} failed: {error}")
            }
            CourierEvent::ValidationRejected { operation, reason } => {
                format!("{operation}: {reason}")
            }
        }
    }

    /// Whether this event reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            CourierEvent::StoreDegraded { .. }
                | CourierEvent::AuthenticationFailed { .. }
                | CourierEvent::AccountScanFailed { .. }
                | CourierEvent::DispatchFailed { .. }
                | CourierEvent::ValidationRejected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagged_serialization() {
        let event = CourierEvent::DialogFound {
            handle: "alice".to_string(),
            account: "work".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "dialog_found");
        assert_eq!(json["account"], "work");

        let parsed: CourierEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_summary_distinguishes_added_and_updated() {
        let added = CourierEvent::TemplateSaved {
            name: "greet".to_string(),
            created: true,
        };
        let updated = CourierEvent::TemplateSaved {
            name: "greet".to_string(),
            created: false,
        };
        assert!(added.summary().contains("added"));
        assert!(updated.summary().contains("updated"));
    }

    #[test]
    fn test_is_error() {
        assert!(CourierEvent::DispatchFailed {
            target: "@bob".to_string(),
            error: "down".to_string(),
        }
        .is_error());
        assert!(!CourierEvent::AccountConnected {
            name: "work".to_string(),
        }
        .is_error());
    }
}
