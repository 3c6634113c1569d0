//! Filesystem helpers for Courier.
//!
//! Data directory resolution, the on-disk layout under it, and the atomic
//! write used by every file-backed store.

use std::path::{Path, PathBuf};

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `COURIER_DATA_DIR` environment variable
/// 2. `~/.courier`
/// 3. `./.courier` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COURIER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".courier");
    }

    PathBuf::from(".courier")
}

/// Fixture file for one phone number: `{offline_dir}/accounts/{phone}.json`.
pub fn fixture_path(offline_dir: &Path, phone: &str) -> PathBuf {
    offline_dir
        .join("accounts")
        .join(format!("{}.json", sanitize_file_stem(phone)))
}

/// Append-only log of messages sent through the offline transport.
pub fn outbox_path(offline_dir: &Path) -> PathBuf {
    offline_dir.join("outbox.jsonl")
}

/// Replace anything that is not alphanumeric or `+`, `-`, `_` with `_`.
fn sanitize_file_stem(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `content` to `path` via a sibling temp file and a rename.
///
/// Readers see either the old file or the new one, never a partial write.
/// Parent directories are created as needed.
pub async fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "courier".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    tokio::fs::write(&tmp, content).await?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err);
    }
    Ok(())
}
