//! DialogResolver: find a conversation by public handle across accounts.
//!
//! Connected accounts are scanned one at a time in registration order. Each
//! account's dialog list is searched users first, then groups, then
//! channels; the first exact (case-insensitive) match ends the scan. A
//! failing account is recorded and skipped.

use std::sync::Arc;

use courier_types::dialog::{AccountFailure, DialogInfo, DialogPeer, PeerKind, normalize_handle};
use courier_types::event::CourierEvent;
use serde::{Deserialize, Serialize};

use crate::account::AccountRegistry;
use crate::event::EventBus;

const SEARCH_ORDER: [PeerKind; 3] = [PeerKind::User, PeerKind::Group, PeerKind::Channel];

/// A search result with the per-account failures met along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogSearch {
    pub dialog: DialogInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AccountFailure>,
    /// How many accounts had their dialog list fetched.
    pub accounts_queried: usize,
}

pub struct DialogResolver {
    registry: Arc<AccountRegistry>,
    events: EventBus,
}

impl DialogResolver {
    pub fn new(registry: Arc<AccountRegistry>, events: EventBus) -> Self {
        Self { registry, events }
    }

    /// Find the dialog for `handle`. Never fails; see [`Self::search_detailed`].
    pub async fn search(&self, handle: &str) -> DialogInfo {
        self.search_detailed(handle).await.dialog
    }

    pub async fn search_detailed(&self, handle: &str) -> DialogSearch {
        let handle = normalize_handle(handle);
        if handle.is_empty() {
            self.events.publish(CourierEvent::ValidationRejected {
                operation: "dialog.search".to_string(),
                reason: "handle cannot be empty".to_string(),
            });
            return DialogSearch {
                dialog: DialogInfo::not_found(&handle),
                failures: Vec::new(),
                accounts_queried: 0,
            };
        }

        let mut failures = Vec::new();
        let mut accounts_queried = 0;

        for (account, session) in self.registry.connected().await {
            accounts_queried += 1;
            let peers = match session.list_dialogs().await {
                Ok(peers) => peers,
                Err(err) => {
                    tracing::warn!(
                        account = %account.name,
                        handle = %handle,
                        error = %err,
                        "dialog scan failed, trying next account"
                    );
                    self.events.publish(CourierEvent::AccountScanFailed {
                        account: account.name.clone(),
                        kind: err.kind(),
                        error: err.to_string(),
                    });
                    failures.push(AccountFailure {
                        account: account.name,
                        kind: err.kind(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            if let Some(peer) = pick_match(&peers, &handle) {
                tracing::debug!(account = %account.name, handle = %handle, peer_id = peer.id, "dialog found");
                self.events.publish(CourierEvent::DialogFound {
                    handle: handle.clone(),
                    account: account.name.clone(),
                });
                return DialogSearch {
                    dialog: DialogInfo::found(&handle, &account.name, peer),
                    failures,
                    accounts_queried,
                };
            }
        }

        self.events.publish(CourierEvent::DialogNotFound {
            handle: handle.clone(),
            accounts_queried,
        });
        DialogSearch {
            dialog: DialogInfo::not_found(&handle),
            failures,
            accounts_queried,
        }
    }
}

fn pick_match(peers: &[DialogPeer], handle: &str) -> Option<DialogPeer> {
    SEARCH_ORDER.iter().find_map(|kind| {
        peers
            .iter()
            .find(|p| p.kind == *kind && p.matches_handle(handle))
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::PresetChallenge;
    use crate::transport::BoxTransport;
    use crate::transport::mock::{MockSession, MockTransport, peer};
    use courier_types::account::AccountConnectionRequest;
    use courier_types::error::ErrorKind;

    async fn registry_with(sessions: Vec<(&str, MockSession)>) -> Arc<AccountRegistry> {
        let mut transport = MockTransport::new();
        let names: Vec<String> = sessions.iter().map(|(n, _)| n.to_string()).collect();
        for (name, session) in sessions {
            transport = transport.with_session(&format!("+{name}"), session);
        }
        let registry = Arc::new(AccountRegistry::new(
            BoxTransport::new(transport),
            EventBus::default(),
        ));
        for name in names {
            registry
                .connect(
                    AccountConnectionRequest::new(name.clone(), 1, "hash", format!("+{name}")),
                    &PresetChallenge::new(),
                )
                .await
                .unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_search_stops_at_first_matching_account() {
        let a = MockSession::new().with_dialog(peer(1, "someone", PeerKind::User));
        let b = MockSession::new().with_dialog(peer(2, "Target", PeerKind::User));
        let c = MockSession::new().with_dialog(peer(3, "target", PeerKind::User));
        let (pa, pb, pc) = (a.probe(), b.probe(), c.probe());
        let registry = registry_with(vec![("A", a), ("B", b), ("C", c)]).await;
        let resolver = DialogResolver::new(registry, EventBus::default());

        let result = resolver.search_detailed("@target").await;
        assert!(result.dialog.found);
        assert_eq!(result.dialog.account.as_deref(), Some("B"));
        assert_eq!(result.dialog.id, 2);
        assert_eq!(result.dialog.handle, "target");
        assert_eq!(result.accounts_queried, 2);
        assert_eq!(pa.lists(), 1);
        assert_eq!(pb.lists(), 1);
        assert_eq!(pc.lists(), 0);
    }

    #[tokio::test]
    async fn test_empty_handle_queries_nothing() {
        let a = MockSession::new();
        let pa = a.probe();
        let registry = registry_with(vec![("A", a)]).await;
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let resolver = DialogResolver::new(registry, bus);

        let result = resolver.search_detailed("  @ ").await;
        assert!(!result.dialog.found);
        assert_eq!(result.accounts_queried, 0);
        assert_eq!(pa.lists(), 0);
        assert!(matches!(
            rx.recv().await.unwrap(),
            CourierEvent::ValidationRejected { .. }
        ));
    }

    #[tokio::test]
    async fn test_failing_account_is_skipped_and_recorded() {
        let a = MockSession::new().failing_list();
        let b = MockSession::new().with_dialog(peer(7, "team", PeerKind::Group));
        let registry = registry_with(vec![("A", a), ("B", b)]).await;
        let resolver = DialogResolver::new(registry, EventBus::default());

        let result = resolver.search_detailed("team").await;
        assert!(result.dialog.found);
        assert_eq!(result.dialog.account.as_deref(), Some("B"));
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].account, "A");
        assert_eq!(result.failures[0].kind, ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_users_preferred_over_channels() {
        let a = MockSession::new()
            .with_dialog(peer(10, "news", PeerKind::Channel))
            .with_dialog(peer(11, "news", PeerKind::User));
        let registry = registry_with(vec![("A", a)]).await;
        let resolver = DialogResolver::new(registry, EventBus::default());

        let dialog = resolver.search("news").await;
        assert_eq!(dialog.id, 11);
        assert_eq!(dialog.peer.map(|p| p.kind), Some(PeerKind::User));
    }

    #[tokio::test]
    async fn test_not_found_preserves_normalized_handle() {
        let registry = registry_with(vec![("A", MockSession::new()), ("B", MockSession::new())]).await;
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let resolver = DialogResolver::new(registry, bus);

        let result = resolver.search_detailed(" @Nobody ").await;
        assert!(!result.dialog.found);
        assert_eq!(result.dialog.handle, "Nobody");
        assert_eq!(result.accounts_queried, 2);
        match rx.recv().await.unwrap() {
            CourierEvent::DialogNotFound {
                accounts_queried, ..
            } => assert_eq!(accounts_queried, 2),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_accounts_returns_not_found() {
        let registry = registry_with(Vec::new()).await;
        let resolver = DialogResolver::new(registry, EventBus::default());
        let result = resolver.search_detailed("alice").await;
        assert!(!result.dialog.found);
        assert_eq!(result.accounts_queried, 0);
    }
}
