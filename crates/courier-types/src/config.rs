//! Global configuration types for Courier.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory: where templates live, pre-declared accounts, and limits.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Template document path, relative to the data directory unless absolute.
    #[serde(default = "default_templates_file")]
    pub templates_file: PathBuf,

    /// Capacity of the notification broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Timeout the CLI applies around each network-bound command.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fixture directory for the offline transport, relative to the data directory.
    #[serde(default = "default_offline_dir")]
    pub offline_dir: PathBuf,

    /// Accounts connected by `courier send`, `courier search`, and `courier serve`.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

fn default_templates_file() -> PathBuf {
    PathBuf::from("templates.json")
}

fn default_event_capacity() -> usize {
    256
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_offline_dir() -> PathBuf {
    PathBuf::from("offline")
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            templates_file: default_templates_file(),
            event_capacity: default_event_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
            offline_dir: default_offline_dir(),
            accounts: Vec::new(),
        }
    }
}

/// A pre-declared account.
///
/// The API hash is never stored in the config file; `api_hash_env` names the
/// environment variable it is read from at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    pub api_id: i32,
    pub phone: String,
    #[serde(default = "default_api_hash_env")]
    pub api_hash_env: String,
}

fn default_api_hash_env() -> String {
    "COURIER_API_HASH".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.templates_file, PathBuf::from("templates.json"));
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.offline_dir, PathBuf::from("offline"));
    }

    #[test]
    fn test_global_config_deserialize_with_accounts() {
        let toml_str = r#"
templates_file = "/srv/courier/templates.json"
request_timeout_secs = 10

[[accounts]]
name = "work"
api_id = 12345
phone = "+15550001"

[[accounts]]
name = "personal"
api_id = 67890
phone = "+15550002"
api_hash_env = "PERSONAL_API_HASH"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].api_hash_env, "COURIER_API_HASH");
        assert_eq!(config.accounts[1].api_hash_env, "PERSONAL_API_HASH");
    }
}
