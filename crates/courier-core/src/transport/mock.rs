//! In-memory transport and session doubles shared by the core unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use courier_types::account::AccountConnectionRequest;
use courier_types::dialog::{DialogPeer, PeerKind};
use courier_types::error::TransportError;

use super::box_session::BoxSession;
use super::login::{LoginStep, MessagingTransport, PendingLogin};
use super::session::MessagingSession;

/// Call counters and captured sends, shared with the test after boxing.
#[derive(Debug, Default)]
pub struct SessionProbe {
    pub list_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl SessionProbe {
    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn resolves(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn sent_texts(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

pub fn peer(id: i64, handle: &str, kind: PeerKind) -> DialogPeer {
    DialogPeer {
        id,
        handle: Some(handle.to_string()),
        title: format!("Title {handle}"),
        kind,
    }
}

#[derive(Debug, Default)]
pub struct MockSession {
    pub profile: Option<String>,
    pub dialogs: Vec<DialogPeer>,
    pub directory: Vec<DialogPeer>,
    pub fail_list: bool,
    pub fail_resolve: bool,
    pub fail_send: bool,
    pub probe: Arc<SessionProbe>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialog(mut self, peer: DialogPeer) -> Self {
        self.dialogs.push(peer);
        self
    }

    pub fn with_directory(mut self, peer: DialogPeer) -> Self {
        self.directory.push(peer);
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn probe(&self) -> Arc<SessionProbe> {
        Arc::clone(&self.probe)
    }
}

impl MessagingSession for MockSession {
    fn profile_name(&self) -> Option<String> {
        self.profile.clone()
    }

    async fn list_dialogs(&self) -> Result<Vec<DialogPeer>, TransportError> {
        self.probe.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(TransportError::Network("dialog list unavailable".to_string()));
        }
        Ok(self.dialogs.clone())
    }

    async fn resolve_handle(&self, handle: &str) -> Result<Option<DialogPeer>, TransportError> {
        self.probe.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_resolve {
            return Err(TransportError::Network("resolve failed".to_string()));
        }
        Ok(self
            .dialogs
            .iter()
            .chain(self.directory.iter())
            .find(|p| p.matches_handle(handle))
            .cloned())
    }

    async fn send_message(&self, peer: &DialogPeer, text: &str) -> Result<(), TransportError> {
        self.probe.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_send {
            return Err(TransportError::Network("send failed".to_string()));
        }
        self.probe
            .sent
            .lock()
            .unwrap()
            .push((peer.id, text.to_string()));
        Ok(())
    }

    async fn disconnect(&self) {
        self.probe.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport whose sign-in flow is configured per test.
///
/// Sessions are handed out by phone number; a phone without a prepared
/// session gets an empty one.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub code: Option<String>,
    pub password: Option<String>,
    pub needs_profile: bool,
    pub reject_start: bool,
    pub sessions: Mutex<HashMap<String, MockSession>>,
    pub logins_started: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_profile_step(mut self) -> Self {
        self.needs_profile = true;
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.reject_start = true;
        self
    }

    pub fn with_session(self, phone: &str, session: MockSession) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .insert(phone.to_string(), session);
        self
    }

    fn authorized(&self, phone: &str) -> LoginStep {
        let session = self
            .sessions
            .lock()
            .unwrap()
            .remove(phone)
            .unwrap_or_default();
        LoginStep::Authorized(BoxSession::new(session))
    }

    fn after_password(&self, pending: &PendingLogin) -> LoginStep {
        if self.needs_profile {
            LoginStep::ProfileRequired(pending.clone())
        } else {
            self.authorized(&pending.phone)
        }
    }

    fn after_code(&self, pending: &PendingLogin) -> LoginStep {
        if self.password.is_some() {
            LoginStep::PasswordRequired {
                pending: pending.clone(),
                hint: Some("pet name".to_string()),
            }
        } else {
            self.after_password(pending)
        }
    }
}

impl MessagingTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start_login(
        &self,
        request: &AccountConnectionRequest,
    ) -> Result<LoginStep, TransportError> {
        self.logins_started.fetch_add(1, Ordering::SeqCst);
        if self.reject_start {
            return Err(TransportError::Rejected("phone banned".to_string()));
        }
        let pending = PendingLogin {
            phone: request.phone.clone(),
            token: "t".to_string(),
        };
        if self.code.is_some() {
            Ok(LoginStep::CodeRequired(pending))
        } else {
            Ok(self.after_code(&pending))
        }
    }

    async fn submit_code(
        &self,
        pending: &PendingLogin,
        code: &str,
    ) -> Result<LoginStep, TransportError> {
        if self.code.as_deref() != Some(code) {
            return Err(TransportError::Rejected("invalid code".to_string()));
        }
        Ok(self.after_code(pending))
    }

    async fn submit_password(
        &self,
        pending: &PendingLogin,
        password: &str,
    ) -> Result<LoginStep, TransportError> {
        if self.password.as_deref() != Some(password) {
            return Err(TransportError::Rejected("invalid password".to_string()));
        }
        Ok(self.after_password(pending))
    }

    async fn submit_profile_name(
        &self,
        pending: &PendingLogin,
        _first_name: &str,
        _last_name: &str,
    ) -> Result<LoginStep, TransportError> {
        Ok(self.authorized(&pending.phone))
    }
}
