//! MessagingTransport trait definition.
//!
//! The transport owns the sign-in protocol. It is driven one step at a time
//! by the account authentication state machine (`account::auth`): each call
//! returns the next `LoginStep`, which either asks for another piece of
//! input or hands back an authorized session.

use std::future::Future;

use courier_types::account::AccountConnectionRequest;
use courier_types::error::TransportError;

use super::box_session::BoxSession;

/// Opaque token for a sign-in in progress.
///
/// Transports put whatever they need to continue the flow in `token`; the
/// core only threads it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub phone: String,
    pub token: String,
}

/// What the transport needs next.
#[derive(Debug)]
pub enum LoginStep {
    /// A verification code was sent to the phone.
    CodeRequired(PendingLogin),
    /// The account has a two-factor password.
    PasswordRequired {
        pending: PendingLogin,
        hint: Option<String>,
    },
    /// The phone has no profile yet; a name is needed to register it.
    ProfileRequired(PendingLogin),
    /// Sign-in finished.
    Authorized(BoxSession),
}

/// Trait for messaging network backends.
///
/// Implementations live in courier-infra (e.g. `OfflineTransport`).
pub trait MessagingTransport: Send + Sync {
    /// Short backend name for logs ("offline").
    fn name(&self) -> &str;

    /// Begin signing in with the given credentials.
    fn start_login(
        &self,
        request: &AccountConnectionRequest,
    ) -> impl Future<Output = Result<LoginStep, TransportError>> + Send;

    fn submit_code(
        &self,
        pending: &PendingLogin,
        code: &str,
    ) -> impl Future<Output = Result<LoginStep, TransportError>> + Send;

    fn submit_password(
        &self,
        pending: &PendingLogin,
        password: &str,
    ) -> impl Future<Output = Result<LoginStep, TransportError>> + Send;

    fn submit_profile_name(
        &self,
        pending: &PendingLogin,
        first_name: &str,
        last_name: &str,
    ) -> impl Future<Output = Result<LoginStep, TransportError>> + Send;
}
