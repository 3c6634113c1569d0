//! BoxTransport -- object-safe dynamic dispatch wrapper for MessagingTransport.
//!
//! Same blanket-impl pattern as `BoxSession`.

use std::future::Future;
use std::pin::Pin;

use courier_types::account::AccountConnectionRequest;
use courier_types::error::TransportError;

use super::login::{LoginStep, MessagingTransport, PendingLogin};

type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<LoginStep, TransportError>> + Send + 'a>>;

/// Object-safe version of [`MessagingTransport`] with boxed futures.
pub trait MessagingTransportDyn: Send + Sync {
    fn name(&self) -> &str;

    fn start_login_boxed<'a>(&'a self, request: &'a AccountConnectionRequest) -> StepFuture<'a>;

    fn submit_code_boxed<'a>(&'a self, pending: &'a PendingLogin, code: &'a str) -> StepFuture<'a>;

    fn submit_password_boxed<'a>(
        &'a self,
        pending: &'a PendingLogin,
        password: &'a str,
    ) -> StepFuture<'a>;

    fn submit_profile_name_boxed<'a>(
        &'a self,
        pending: &'a PendingLogin,
        first_name: &'a str,
        last_name: &'a str,
    ) -> StepFuture<'a>;
}

impl<T: MessagingTransport> MessagingTransportDyn for T {
    fn name(&self) -> &str {
        MessagingTransport::name(self)
    }

    fn start_login_boxed<'a>(&'a self, request: &'a AccountConnectionRequest) -> StepFuture<'a> {
        Box::pin(self.start_login(request))
    }

    fn submit_code_boxed<'a>(&'a self, pending: &'a PendingLogin, code: &'a str) -> StepFuture<'a> {
        Box::pin(self.submit_code(pending, code))
    }

    fn submit_password_boxed<'a>(
        &'a self,
        pending: &'a PendingLogin,
        password: &'a str,
    ) -> StepFuture<'a> {
        Box::pin(self.submit_password(pending, password))
    }

    fn submit_profile_name_boxed<'a>(
        &'a self,
        pending: &'a PendingLogin,
        first_name: &'a str,
        last_name: &'a str,
    ) -> StepFuture<'a> {
        Box::pin(self.submit_profile_name(pending, first_name, last_name))
    }
}

/// Type-erased transport for runtime backend selection.
pub struct BoxTransport {
    inner: Box<dyn MessagingTransportDyn + Send + Sync>,
}

impl BoxTransport {
    pub fn new<T: MessagingTransport + 'static>(transport: T) -> Self {
        Self {
            inner: Box::new(transport),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn start_login(
        &self,
        request: &AccountConnectionRequest,
    ) -> Result<LoginStep, TransportError> {
        self.inner.start_login_boxed(request).await
    }

    pub async fn submit_code(
        &self,
        pending: &PendingLogin,
        code: &str,
    ) -> Result<LoginStep, TransportError> {
        self.inner.submit_code_boxed(pending, code).await
    }

    pub async fn submit_password(
        &self,
        pending: &PendingLogin,
        password: &str,
    ) -> Result<LoginStep, TransportError> {
        self.inner.submit_password_boxed(pending, password).await
    }

    pub async fn submit_profile_name(
        &self,
        pending: &PendingLogin,
        first_name: &str,
        last_name: &str,
    ) -> Result<LoginStep, TransportError> {
        self.inner
            .submit_profile_name_boxed(pending, first_name, last_name)
            .await
    }
}

impl std::fmt::Debug for BoxTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTransport")
            .field("name", &self.inner.name())
            .finish()
    }
}
