//! AccountRegistry: the set of connected accounts and their sessions.
//!
//! Entries are kept in registration order; the resolver and dispatcher scan
//! them in that order. Sign-in runs outside the lock, only the final insert
//! takes the write lock. Sessions are handed out as `Arc<BoxSession>` so no
//! network call ever happens while the lock is held.

use std::sync::Arc;

use courier_types::account::{Account, AccountConnectionRequest};
use courier_types::error::AccountError;
use courier_types::event::CourierEvent;
use tokio::sync::RwLock;

use super::auth::AuthFlow;
use super::challenge::ChallengeHandler;
use crate::event::EventBus;
use crate::transport::{BoxSession, BoxTransport};

struct AccountEntry {
    account: Account,
    session: Arc<BoxSession>,
}

/// Registry of authenticated accounts, keyed by unique name.
pub struct AccountRegistry {
    transport: BoxTransport,
    entries: RwLock<Vec<AccountEntry>>,
    events: EventBus,
}

impl AccountRegistry {
    pub fn new(transport: BoxTransport, events: EventBus) -> Self {
        Self {
            transport,
            entries: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Name of the underlying transport.
    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Authenticate a new account and add it to the registry.
    ///
    /// A name that is already registered is refused before any network
    /// call. The check is repeated under the write lock; if a concurrent
    /// connect won the name in the meantime, the new session is released.
    pub async fn connect<C: ChallengeHandler>(
        &self,
        request: AccountConnectionRequest,
        challenge: &C,
    ) -> Result<Account, AccountError> {
        if let Err(err) = request.validate() {
            self.events.publish(CourierEvent::ValidationRejected {
                operation: "account.connect".to_string(),
                reason: err.to_string(),
            });
            return Err(err);
        }

        let name = request.name.trim().to_string();
        if self.contains(&name).await {
            return Err(AccountError::AlreadyConnected(name));
        }

        let session = match AuthFlow::new(&self.transport, challenge).run(&request).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(account = %name, error = %err, "account sign-in failed");
                self.events.publish(CourierEvent::AuthenticationFailed {
                    name: name.clone(),
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let account = request.into_account(session.profile_name());
        let session = Arc::new(session);

        {
            let mut entries = self.entries.write().await;
            if !entries.iter().any(|e| e.account.name == name) {
                entries.push(AccountEntry {
                    account: account.clone(),
                    session,
                });
                drop(entries);
                tracing::info!(account = %name, "account connected");
                self.events.publish(CourierEvent::AccountConnected { name });
                return Ok(account);
            }
        }

        tracing::warn!(account = %name, "account registered concurrently, releasing new session");
        session.disconnect().await;
        Err(AccountError::AlreadyConnected(name))
    }

    /// Remove an account and release its session.
    pub async fn disconnect(&self, name: &str) -> Result<(), AccountError> {
        let name = name.trim();
        let entry = {
            let mut entries = self.entries.write().await;
            let pos = entries
                .iter()
                .position(|e| e.account.name == name)
                .ok_or_else(|| AccountError::NotFound(name.to_string()))?;
            entries.remove(pos)
        };
        entry.session.disconnect().await;
        tracing::info!(account = %name, "account disconnected");
        self.events.publish(CourierEvent::AccountDisconnected {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Release every session. Returns the number of accounts removed.
    pub async fn disconnect_all(&self) -> usize {
        let drained: Vec<AccountEntry> = {
            let mut entries = self.entries.write().await;
            entries.drain(..).collect()
        };
        let count = drained.len();
        for entry in drained {
            entry.session.disconnect().await;
            self.events.publish(CourierEvent::AccountDisconnected {
                name: entry.account.name,
            });
        }
        if count > 0 {
            tracing::info!(count, "all accounts disconnected");
        }
        count
    }

    /// Snapshot of all accounts in registration order.
    pub async fn list(&self) -> Vec<Account> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.account.clone())
            .collect()
    }

    pub async fn get(&self, name: &str) -> Option<Account> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.account.name == name.trim())
            .map(|e| e.account.clone())
    }

    /// Session for one account, if it is connected.
    pub async fn session(&self, name: &str) -> Option<Arc<BoxSession>> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.account.name == name.trim() && e.account.connected)
            .map(|e| Arc::clone(&e.session))
    }

    /// Connected accounts paired with their sessions, in registration order.
    pub async fn connected(&self) -> Vec<(Account, Arc<BoxSession>)> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.account.connected)
            .map(|e| (e.account.clone(), Arc::clone(&e.session)))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .await
            .iter()
            .any(|e| e.account.name == name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::account::challenge::PresetChallenge;
    use crate::transport::mock::{MockSession, MockTransport};

    fn request(name: &str, phone: &str) -> AccountConnectionRequest {
        AccountConnectionRequest::new(name, 1, "hash", phone)
    }

    fn code() -> PresetChallenge {
        PresetChallenge::new().with_code("111")
    }

    #[tokio::test]
    async fn test_connect_appends_in_registration_order() {
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new().with_code("111")),
            EventBus::default(),
        );
        registry.connect(request("a", "+1"), &code()).await.unwrap();
        registry.connect(request("b", "+2"), &code()).await.unwrap();
        registry.connect(request("c", "+3"), &code()).await.unwrap();

        let names: Vec<String> = registry.list().await.into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(registry.connected().await.len(), 3);
    }

    #[tokio::test]
    async fn test_connect_records_profile_name() {
        let session = MockSession {
            profile: Some("Ann".to_string()),
            ..MockSession::default()
        };
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new().with_session("+1", session)),
            EventBus::default(),
        );
        let account = registry
            .connect(request("work", "+1"), &PresetChallenge::new())
            .await
            .unwrap();
        assert!(account.connected);
        assert_eq!(account.display_name.as_deref(), Some("Ann"));
        assert!(account.connected_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_before_network() {
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new()),
            EventBus::default(),
        );
        registry
            .connect(request("work", "+1"), &PresetChallenge::new())
            .await
            .unwrap();
        let err = registry
            .connect(request(" work ", "+2"), &PresetChallenge::new())
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::AlreadyConnected("work".to_string()));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let registry = AccountRegistry::new(BoxTransport::new(MockTransport::new()), bus);
        let err = registry
            .connect(request("work", ""), &PresetChallenge::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
        assert!(registry.is_empty().await);
        assert!(matches!(
            rx.recv().await.unwrap(),
            CourierEvent::ValidationRejected { .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_auth_emits_event_and_adds_nothing() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new().with_code("111")),
            bus,
        );
        let err = registry
            .connect(request("work", "+1"), &PresetChallenge::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AuthenticationFailed(_)));
        assert!(registry.is_empty().await);
        match rx.recv().await.unwrap() {
            CourierEvent::AuthenticationFailed { name, .. } => assert_eq!(name, "work"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disconnect_releases_session() {
        let session = MockSession::new();
        let probe = session.probe();
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new().with_session("+1", session)),
            EventBus::default(),
        );
        registry
            .connect(request("work", "+1"), &PresetChallenge::new())
            .await
            .unwrap();

        registry.disconnect("work").await.unwrap();
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);
        assert!(registry.get("work").await.is_none());
        assert!(registry.session("work").await.is_none());
    }

    /// Hands out the code only once both sign-ins have started.
    struct RendezvousChallenge {
        barrier: tokio::sync::Barrier,
    }

    impl ChallengeHandler for RendezvousChallenge {
        async fn request_code(&self, _phone: &str) -> Option<String> {
            self.barrier.wait().await;
            Some("111".to_string())
        }

        async fn request_password(&self, _phone: &str, _hint: Option<&str>) -> Option<String> {
            None
        }

        async fn request_profile_name(&self, _phone: &str) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_concurrent_connect_same_name_releases_loser() {
        let first = MockSession::new();
        let second = MockSession::new();
        let (p1, p2) = (first.probe(), second.probe());
        let registry = AccountRegistry::new(
            BoxTransport::new(
                MockTransport::new()
                    .with_code("111")
                    .with_session("+1", first)
                    .with_session("+2", second),
            ),
            EventBus::default(),
        );
        let challenge = RendezvousChallenge {
            barrier: tokio::sync::Barrier::new(2),
        };

        let (r1, r2) = tokio::join!(
            registry.connect(request("work", "+1"), &challenge),
            registry.connect(request("work", "+2"), &challenge),
        );

        let results = [r1, r2];
        let rejected: Vec<_> = results
            .iter()
            .filter(|r| matches!(r, Err(AccountError::AlreadyConnected(_))))
            .collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(registry.len().await, 1);

        let loser_probe = if results[0].is_ok() { &p2 } else { &p1 };
        let winner_probe = if results[0].is_ok() { &p1 } else { &p2 };
        assert_eq!(loser_probe.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(winner_probe.disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookups_trim_names() {
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new()),
            EventBus::default(),
        );
        registry
            .connect(request(" work ", "+1"), &PresetChallenge::new())
            .await
            .unwrap();

        assert!(registry.get(" work").await.is_some());
        assert!(registry.session("work ").await.is_some());
        registry.disconnect(" work ").await.unwrap();
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_disconnect_unknown_is_not_found() {
        let registry = AccountRegistry::new(
            BoxTransport::new(MockTransport::new()),
            EventBus::default(),
        );
        let err = registry.disconnect("ghost").await.unwrap_err();
        assert_eq!(err, AccountError::NotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_disconnect_all_drains_registry() {
        let first = MockSession::new();
        let second = MockSession::new();
        let (p1, p2) = (first.probe(), second.probe());
        let registry = AccountRegistry::new(
            BoxTransport::new(
                MockTransport::new()
                    .with_session("+1", first)
                    .with_session("+2", second),
            ),
            EventBus::default(),
        );
        let challenge = PresetChallenge::new();
        registry.connect(request("a", "+1"), &challenge).await.unwrap();
        registry.connect(request("b", "+2"), &challenge).await.unwrap();

        assert_eq!(registry.disconnect_all().await, 2);
        assert!(registry.is_empty().await);
        assert_eq!(p1.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(p2.disconnects.load(Ordering::SeqCst), 1);
    }
}
