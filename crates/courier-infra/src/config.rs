//! Global configuration loader for Courier.
//!
//! Reads `config.toml` from the data directory (`~/.courier/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use courier_types::account::AccountConnectionRequest;
use courier_types::config::{AccountConfig, GlobalConfig};
use courier_types::error::AccountError;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Resolve a configured path against the data directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(data_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        data_dir.join(configured)
    }
}

/// Build a connection request for a configured account.
///
/// The API hash comes from the environment variable named by
/// `api_hash_env`; an unset or empty variable is a validation error.
pub fn connection_request(account: &AccountConfig) -> Result<AccountConnectionRequest, AccountError> {
    let api_hash = std::env::var(&account.api_hash_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            AccountError::Validation(format!(
                "environment variable {} is not set for account '{}'",
                account.api_hash_env, account.name
            ))
        })?;
    Ok(AccountConnectionRequest::new(
        account.name.clone(),
        account.api_id,
        api_hash,
        account.phone.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.event_capacity, 256);
        assert!(config.accounts.is_empty());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
request_timeout_secs = 5

[[accounts]]
name = "work"
api_id = 12345
phone = "+15550001"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].name, "work");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn resolve_path_keeps_absolute() {
        let data = Path::new("/data");
        assert_eq!(
            resolve_path(data, Path::new("/etc/templates.json")),
            PathBuf::from("/etc/templates.json")
        );
        assert_eq!(
            resolve_path(data, Path::new("templates.json")),
            PathBuf::from("/data/templates.json")
        );
    }

    #[test]
    fn connection_request_reads_hash_from_env() {
        let account = AccountConfig {
            name: "work".to_string(),
            api_id: 1,
            phone: "+1".to_string(),
            api_hash_env: "COURIER_TEST_HASH_PRESENT".to_string(),
        };
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("COURIER_TEST_HASH_PRESENT", "abc") };
        let request = connection_request(&account).unwrap();
        assert_eq!(request.api_hash.expose_secret(), "abc");
        assert_eq!(request.name, "work");
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("COURIER_TEST_HASH_PRESENT") };
    }

    #[test]
    fn connection_request_missing_env_is_validation_error() {
        let account = AccountConfig {
            name: "work".to_string(),
            api_id: 1,
            phone: "+1".to_string(),
            api_hash_env: "COURIER_TEST_HASH_ABSENT".to_string(),
        };
        let err = connection_request(&account).unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }
}
