use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// What kind of conversation a peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerKind {
    User,
    Group,
    Channel,
}

impl fmt::Display for PeerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerKind::User => write!(f, "user"),
            PeerKind::Group => write!(f, "group"),
            PeerKind::Channel => write!(f, "channel"),
        }
    }
}

/// A conversation target as reported by a transport session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogPeer {
    pub id: i64,
    /// Public handle without the leading `@`, if the peer has one.
    #[serde(default)]
    pub handle: Option<String>,
    /// Display name (user's full name, group or channel title).
    #[serde(default)]
    pub title: String,
    pub kind: PeerKind,
}

impl DialogPeer {
    /// Case-insensitive exact comparison against a normalized handle.
    pub fn matches_handle(&self, handle: &str) -> bool {
        self.handle
            .as_deref()
            .map(|h| normalize_handle(h).eq_ignore_ascii_case(handle))
            .unwrap_or(false)
    }
}

/// Result of a dialog search.
///
/// `account` names the account whose session found the dialog. It is a
/// lookup key into the registry, the account's lifetime is independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogInfo {
    pub handle: String,
    pub id: i64,
    pub title: String,
    pub account: Option<String>,
    pub found: bool,
    pub peer: Option<DialogPeer>,
}

impl DialogInfo {
    pub fn found(handle: &str, account: &str, peer: DialogPeer) -> Self {
        let title = if peer.title.trim().is_empty() {
            format!("@{handle}")
        } else {
            peer.title.clone()
        };
        Self {
            handle: handle.to_string(),
            id: peer.id,
            title,
            account: Some(account.to_string()),
            found: true,
            peer: Some(peer),
        }
    }

    pub fn not_found(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            id: 0,
            title: String::new(),
            account: None,
            found: false,
            peer: None,
        }
    }
}

/// One account's failure during a multi-account scan or fallback dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFailure {
    pub account: String,
    pub kind: ErrorKind,
    pub error: String,
}

impl fmt::Display for AccountFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.account, self.error)
    }
}

/// Strip surrounding whitespace and any leading `@` from a handle.
///
/// ```
/// use courier_types::dialog::normalize_handle;
///
/// assert_eq!(normalize_handle("@alice"), "alice");
/// assert_eq!(normalize_handle("  bob "), "bob");
/// assert_eq!(normalize_handle("@"), "");
/// ```
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(handle: Option<&str>, title: &str) -> DialogPeer {
        DialogPeer {
            id: 42,
            handle: handle.map(str::to_string),
            title: title.to_string(),
            kind: PeerKind::User,
        }
    }

    #[test]
    fn test_matches_handle_case_insensitive() {
        let p = peer(Some("Alice"), "Alice A.");
        assert!(p.matches_handle("alice"));
        assert!(p.matches_handle("ALICE"));
        assert!(!p.matches_handle("alic"));
    }

    #[test]
    fn test_matches_handle_without_handle() {
        assert!(!peer(None, "No Handle").matches_handle("anything"));
    }

    #[test]
    fn test_found_falls_back_to_handle_title() {
        let info = DialogInfo::found("alice", "work", peer(Some("alice"), ""));
        assert!(info.found);
        assert_eq!(info.title, "@alice");
        assert_eq!(info.account.as_deref(), Some("work"));
        assert_eq!(info.id, 42);
    }

    #[test]
    fn test_not_found_preserves_handle() {
        let info = DialogInfo::not_found("ghost");
        assert!(!info.found);
        assert_eq!(info.handle, "ghost");
        assert!(info.peer.is_none());
    }

    #[test]
    fn test_peer_kind_serde() {
        let json = serde_json::to_string(&PeerKind::Channel).unwrap();
        assert_eq!(json, "\"channel\"");
    }
}
