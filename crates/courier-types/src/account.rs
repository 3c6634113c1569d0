use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::AccountError;

/// A messaging account known to the registry.
///
/// This is the serializable snapshot of an account. The live session handle
/// is held by the registry next to it and never leaves the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique key chosen by the operator ("work", "personal").
    pub name: String,
    /// Application identifier issued by the messaging network.
    pub api_id: i32,
    /// Phone number the account signs in with.
    pub phone: String,
    /// Whether a live session is attached.
    pub connected: bool,
    /// Profile name reported by the session after sign-in.
    pub display_name: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
}

/// Input for connecting a new account. Never persisted.
#[derive(Debug)]
pub struct AccountConnectionRequest {
    pub name: String,
    pub api_id: i32,
    pub api_hash: SecretString,
    pub phone: String,
}

impl AccountConnectionRequest {
    pub fn new(
        name: impl Into<String>,
        api_id: i32,
        api_hash: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_id,
            api_hash: SecretString::from(api_hash.into()),
            phone: phone.into(),
        }
    }

    /// Reject requests with missing required fields.
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.name.trim().is_empty() {
            return Err(AccountError::Validation("name cannot be empty".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(AccountError::Validation("phone cannot be empty".to_string()));
        }
        if self.api_id <= 0 {
            return Err(AccountError::Validation(
                "api_id must be a positive integer".to_string(),
            ));
        }
        if self.api_hash.expose_secret().trim().is_empty() {
            return Err(AccountError::Validation(
                "api_hash cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the connected account record for this request.
    pub fn into_account(self, display_name: Option<String>) -> Account {
        Account {
            name: self.name.trim().to_string(),
            api_id: self.api_id,
            phone: self.phone.trim().to_string(),
            connected: true,
            display_name,
            connected_at: Some(Utc::now()),
        }
    }
}
