//! Offline transport backed by fixture files.
//!
//! Each phone number has a fixture at `{dir}/accounts/{phone}.json`
//! describing its sign-in answers and the dialogs its session sees. Sent
//! messages are appended to `{dir}/outbox.jsonl` instead of leaving the
//! machine. Fixture handles written as `fail:name` appear as `name`, and
//! every send to them fails with a network error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use courier_core::transport::{BoxSession, LoginStep, MessagingSession, MessagingTransport, PendingLogin};
use courier_types::account::AccountConnectionRequest;
use courier_types::dialog::DialogPeer;
use courier_types::error::TransportError;

use crate::filesystem::{fixture_path, outbox_path};

const FAIL_PREFIX: &str = "fail:";

const STEP_CODE: &str = "code";
const STEP_PASSWORD: &str = "password";
const STEP_PROFILE: &str = "profile";

fn default_registered() -> bool {
    true
}

/// Sign-in answers and visible peers for one phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineFixture {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hint: Option<String>,
    /// `false` means the phone must pick a profile name on first sign-in.
    #[serde(default = "default_registered")]
    pub registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    /// Conversations the account already has.
    #[serde(default)]
    pub dialogs: Vec<DialogPeer>,
    /// Extra public handles the account can resolve.
    #[serde(default)]
    pub directory: Vec<DialogPeer>,
}

/// One line of `outbox.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub account_phone: String,
    pub peer_id: i64,
    pub handle: Option<String>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Read every message the offline transport has sent from `dir`.
///
/// Unparseable lines are skipped.
pub async fn read_outbox(dir: &Path) -> std::io::Result<Vec<OutboxRecord>> {
    let content = match tokio::fs::read_to_string(outbox_path(dir)).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    Ok(content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect())
}

/// Transport that signs in against fixture files.
#[derive(Debug, Clone)]
pub struct OfflineTransport {
    dir: PathBuf,
    outbox_lock: Arc<Mutex<()>>,
}

impl OfflineTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            outbox_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write (or replace) the fixture for `phone`.
    pub async fn write_fixture(&self, phone: &str, fixture: &OfflineFixture) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(fixture).map_err(std::io::Error::other)?;
        crate::filesystem::write_atomic(&fixture_path(&self.dir, phone), json.as_bytes()).await
    }

    async fn fixture(&self, phone: &str) -> Result<OfflineFixture, TransportError> {
        let path = fixture_path(&self.dir, phone);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransportError::Rejected(
                    "phone not registered with offline transport".to_string(),
                ));
            }
            Err(err) => {
                return Err(TransportError::Network(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&content).map_err(|e| {
            TransportError::Protocol(format!("malformed fixture {}: {e}", path.display()))
        })
    }

    fn pending(phone: &str, step: &str) -> PendingLogin {
        PendingLogin {
            phone: phone.to_string(),
            token: step.to_string(),
        }
    }

    fn expect_step(pending: &PendingLogin, step: &str) -> Result<(), TransportError> {
        if pending.token == step {
            Ok(())
        } else {
            Err(TransportError::Protocol(format!(
                "expected sign-in step '{step}', got '{}'",
                pending.token
            )))
        }
    }

    fn after_code(&self, phone: &str, fixture: OfflineFixture) -> LoginStep {
        if fixture.password.is_some() {
            LoginStep::PasswordRequired {
                pending: Self::pending(phone, STEP_PASSWORD),
                hint: fixture.password_hint,
            }
        } else {
            self.after_password(phone, fixture)
        }
    }

    fn after_password(&self, phone: &str, fixture: OfflineFixture) -> LoginStep {
        if fixture.registered {
            let profile = fixture.profile_name.clone();
            LoginStep::Authorized(self.session(phone, fixture, profile))
        } else {
            LoginStep::ProfileRequired(Self::pending(phone, STEP_PROFILE))
        }
    }

    fn session(&self, phone: &str, fixture: OfflineFixture, profile: Option<String>) -> BoxSession {
        BoxSession::new(OfflineSession::new(
            phone,
            profile,
            fixture.dialogs,
            fixture.directory,
            outbox_path(&self.dir),
            Arc::clone(&self.outbox_lock),
        ))
    }
}

impl MessagingTransport for OfflineTransport {
    fn name(&self) -> &str {
        "offline"
    }

    async fn start_login(
        &self,
        request: &AccountConnectionRequest,
    ) -> Result<LoginStep, TransportError> {
        let phone = request.phone.trim();
        self.fixture(phone).await?;
        tracing::debug!(phone = %phone, "offline sign-in started");
        Ok(LoginStep::CodeRequired(Self::pending(phone, STEP_CODE)))
    }

    async fn submit_code(
        &self,
        pending: &PendingLogin,
        code: &str,
    ) -> Result<LoginStep, TransportError> {
        Self::expect_step(pending, STEP_CODE)?;
        let fixture = self.fixture(&pending.phone).await?;
        if fixture.code != code {
            return Err(TransportError::Rejected("invalid verification code".to_string()));
        }
        Ok(self.after_code(&pending.phone, fixture))
    }

    async fn submit_password(
        &self,
        pending: &PendingLogin,
        password: &str,
    ) -> Result<LoginStep, TransportError> {
        Self::expect_step(pending, STEP_PASSWORD)?;
        let fixture = self.fixture(&pending.phone).await?;
        if fixture.password.as_deref() != Some(password) {
            return Err(TransportError::Rejected("invalid password".to_string()));
        }
        Ok(self.after_password(&pending.phone, fixture))
    }

    async fn submit_profile_name(
        &self,
        pending: &PendingLogin,
        first_name: &str,
        last_name: &str,
    ) -> Result<LoginStep, TransportError> {
        Self::expect_step(pending, STEP_PROFILE)?;
        let fixture = self.fixture(&pending.phone).await?;
        let profile = format!("{first_name} {last_name}").trim().to_string();
        Ok(LoginStep::Authorized(self.session(
            &pending.phone,
            fixture,
            Some(profile),
        )))
    }
}

/// Signed-in offline account.
#[derive(Debug)]
pub struct OfflineSession {
    phone: String,
    profile: Option<String>,
    dialogs: Vec<DialogPeer>,
    directory: Vec<DialogPeer>,
    failing: HashSet<i64>,
    outbox: PathBuf,
    outbox_lock: Arc<Mutex<()>>,
    closed: AtomicBool,
}

impl OfflineSession {
    fn new(
        phone: &str,
        profile: Option<String>,
        dialogs: Vec<DialogPeer>,
        directory: Vec<DialogPeer>,
        outbox: PathBuf,
        outbox_lock: Arc<Mutex<()>>,
    ) -> Self {
        let mut failing = HashSet::new();
        let mut strip = |peers: Vec<DialogPeer>| -> Vec<DialogPeer> {
            peers
                .into_iter()
                .map(|mut peer| {
                    if let Some(rest) = peer.handle.as_deref().and_then(|h| h.strip_prefix(FAIL_PREFIX)) {
                        peer.handle = Some(rest.to_string());
                        failing.insert(peer.id);
                    }
                    peer
                })
                .collect()
        };
        let dialogs = strip(dialogs);
        let directory = strip(directory);
        Self {
            phone: phone.to_string(),
            profile,
            dialogs,
            directory,
            failing,
            outbox,
            outbox_lock,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(TransportError::SessionClosed)
        } else {
            Ok(())
        }
    }

    async fn append_outbox(&self, record: &OutboxRecord) -> Result<(), TransportError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| TransportError::Protocol(format!("failed to encode message: {e}")))?;
        line.push('\n');

        let _guard = self.outbox_lock.lock().await;
        if let Some(parent) = self.outbox.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.outbox)
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

impl MessagingSession for OfflineSession {
    fn profile_name(&self) -> Option<String> {
        self.profile.clone()
    }

    async fn list_dialogs(&self) -> Result<Vec<DialogPeer>, TransportError> {
        self.ensure_open()?;
        Ok(self.dialogs.clone())
    }

    async fn resolve_handle(&self, handle: &str) -> Result<Option<DialogPeer>, TransportError> {
        self.ensure_open()?;
        Ok(self
            .dialogs
            .iter()
            .chain(self.directory.iter())
            .find(|p| p.matches_handle(handle))
            .cloned())
    }

    async fn send_message(&self, peer: &DialogPeer, text: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        if self.failing.contains(&peer.id) {
            return Err(TransportError::Network(format!(
                "simulated delivery failure to peer {}",
                peer.id
            )));
        }
        self.append_outbox(&OutboxRecord {
            account_phone: self.phone.clone(),
            peer_id: peer.id,
            handle: peer.handle.clone(),
            text: text.to_string(),
            sent_at: Utc::now(),
        })
        .await?;
        tracing::debug!(phone = %self.phone, peer_id = peer.id, "offline message written to outbox");
        Ok(())
    }

    async fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
