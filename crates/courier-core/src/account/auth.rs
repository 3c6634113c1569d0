//! Account sign-in as an explicit state machine.
//!
//! ```text
//! start_login ─┬─> AwaitingCode ──> AwaitingPassword ──> AwaitingProfileName ─┐
//!              │         │                  │                     │           │
//!              │         └──────────────────┴─────────────────────┴──> Authenticated
//!              └─────────────── any missing answer or rejection ─────> Failed
//! ```
//!
//! Each non-terminal state asks the `ChallengeHandler` for one answer and
//! submits it to the transport; the transport's `LoginStep` picks the next
//! state. There are no retries: a missing answer or a rejected one ends the
//! flow in `Failed`. Transitions only move forward; a step that asks again
//! for the current input (or an earlier one) is a protocol error.

use courier_types::account::AccountConnectionRequest;
use courier_types::error::{AccountError, TransportError};

use super::challenge::{ChallengeHandler, split_profile_name};
use crate::transport::{BoxSession, BoxTransport, LoginStep, PendingLogin};

/// Where a sign-in currently stands.
#[derive(Debug)]
pub enum AuthState {
    AwaitingCode(PendingLogin),
    AwaitingPassword {
        pending: PendingLogin,
        hint: Option<String>,
    },
    AwaitingProfileName(PendingLogin),
    Authenticated(BoxSession),
    Failed(AccountError),
}

impl AuthState {
    /// Short state name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::AwaitingCode(_) => "awaiting_code",
            AuthState::AwaitingPassword { .. } => "awaiting_password",
            AuthState::AwaitingProfileName(_) => "awaiting_profile_name",
            AuthState::Authenticated(_) => "authenticated",
            AuthState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::Authenticated(_) | AuthState::Failed(_))
    }

    /// Position along code -> password -> profile -> terminal.
    fn rank(&self) -> u8 {
        match self {
            AuthState::AwaitingCode(_) => 0,
            AuthState::AwaitingPassword { .. } => 1,
            AuthState::AwaitingProfileName(_) => 2,
            AuthState::Authenticated(_) | AuthState::Failed(_) => 3,
        }
    }

    /// Accept `next` only if it lies strictly after a state of rank `from`.
    fn forward_from(from: u8, next: AuthState) -> Self {
        if next.rank() > from {
            return next;
        }
        tracing::warn!(state = next.label(), "transport asked for a step that was already passed");
        AuthState::Failed(AccountError::Transport(TransportError::Protocol(format!(
            "sign-in went back to {}",
            next.label()
        ))))
    }

    fn from_step(result: Result<LoginStep, TransportError>) -> Self {
        match result {
            Ok(LoginStep::CodeRequired(pending)) => AuthState::AwaitingCode(pending),
            Ok(LoginStep::PasswordRequired { pending, hint }) => {
                AuthState::AwaitingPassword { pending, hint }
            }
            Ok(LoginStep::ProfileRequired(pending)) => AuthState::AwaitingProfileName(pending),
            Ok(LoginStep::Authorized(session)) => AuthState::Authenticated(session),
            Err(TransportError::Rejected(reason)) => {
                AuthState::Failed(AccountError::AuthenticationFailed(reason))
            }
            Err(err) => AuthState::Failed(AccountError::Transport(err)),
        }
    }

    fn missing(what: &str) -> Self {
        AuthState::Failed(AccountError::AuthenticationFailed(format!(
            "{what} not provided"
        )))
    }
}

/// Drives one sign-in from `start_login` to a terminal state.
pub struct AuthFlow<'a, C> {
    transport: &'a BoxTransport,
    challenge: &'a C,
}

impl<'a, C: ChallengeHandler> AuthFlow<'a, C> {
    pub fn new(transport: &'a BoxTransport, challenge: &'a C) -> Self {
        Self {
            transport,
            challenge,
        }
    }

    /// Run the flow to completion and return the authorized session.
    pub async fn run(&self, request: &AccountConnectionRequest) -> Result<BoxSession, AccountError> {
        let mut state = AuthState::from_step(self.transport.start_login(request).await);
        loop {
            tracing::debug!(
                account = %request.name,
                transport = self.transport.name(),
                state = state.label(),
                "sign-in state"
            );
            state = match state {
                AuthState::Authenticated(session) => return Ok(session),
                AuthState::Failed(err) => return Err(err),
                pending => self.advance(pending).await,
            };
        }
    }

    /// Perform a single transition. Terminal states are returned as-is.
    ///
    /// The next state must lie strictly after `state`; anything else ends in
    /// `Failed` with a protocol error.
    pub async fn advance(&self, state: AuthState) -> AuthState {
        if state.is_terminal() {
            return state;
        }
        let from = state.rank();
        let next = self.step(state).await;
        AuthState::forward_from(from, next)
    }

    async fn step(&self, state: AuthState) -> AuthState {
        match state {
            AuthState::AwaitingCode(pending) => {
                match self.challenge.request_code(&pending.phone).await {
                    Some(code) => {
                        AuthState::from_step(
                            self.transport.submit_code(&pending, code.trim()).await,
                        )
                    }
                    None => AuthState::missing("verification code"),
                }
            }
            AuthState::AwaitingPassword { pending, hint } => {
                match self
                    .challenge
                    .request_password(&pending.phone, hint.as_deref())
                    .await
                {
                    Some(password) => AuthState::from_step(
                        self.transport.submit_password(&pending, &password).await,
                    ),
                    None => AuthState::missing("two-factor password"),
                }
            }
            AuthState::AwaitingProfileName(pending) => {
                match self.challenge.request_profile_name(&pending.phone).await {
                    Some(name) if !name.trim().is_empty() => {
                        let (first, last) = split_profile_name(&name);
                        AuthState::from_step(
                            self.transport
                                .submit_profile_name(&pending, &first, &last)
                                .await,
                        )
                    }
                    _ => AuthState::missing("profile name"),
                }
            }
            terminal => terminal,
        }
    }
}
