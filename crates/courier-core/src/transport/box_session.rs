//! BoxSession -- object-safe dynamic dispatch wrapper for MessagingSession.
//!
//! 1. Define an object-safe `MessagingSessionDyn` trait with boxed futures
//! 2. Blanket-impl `MessagingSessionDyn` for all `T: MessagingSession`
//! 3. `BoxSession` wraps `Box<dyn MessagingSessionDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use courier_types::dialog::DialogPeer;
use courier_types::error::TransportError;

use super::session::MessagingSession;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`MessagingSession`] with boxed futures.
pub trait MessagingSessionDyn: Send + Sync {
    fn profile_name(&self) -> Option<String>;

    fn list_dialogs_boxed(&self) -> BoxFuture<'_, Result<Vec<DialogPeer>, TransportError>>;

    fn resolve_handle_boxed<'a>(
        &'a self,
        handle: &'a str,
    ) -> BoxFuture<'a, Result<Option<DialogPeer>, TransportError>>;

    fn send_message_boxed<'a>(
        &'a self,
        peer: &'a DialogPeer,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), TransportError>>;

    fn disconnect_boxed(&self) -> BoxFuture<'_, ()>;
}

impl<T: MessagingSession> MessagingSessionDyn for T {
    fn profile_name(&self) -> Option<String> {
        MessagingSession::profile_name(self)
    }

    fn list_dialogs_boxed(&self) -> BoxFuture<'_, Result<Vec<DialogPeer>, TransportError>> {
        Box::pin(self.list_dialogs())
    }

    fn resolve_handle_boxed<'a>(
        &'a self,
        handle: &'a str,
    ) -> BoxFuture<'a, Result<Option<DialogPeer>, TransportError>> {
        Box::pin(self.resolve_handle(handle))
    }

    fn send_message_boxed<'a>(
        &'a self,
        peer: &'a DialogPeer,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(self.send_message(peer, text))
    }

    fn disconnect_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.disconnect())
    }
}

/// Type-erased session handle.
///
/// Since `MessagingSession` uses RPITIT it cannot be a trait object directly;
/// `BoxSession` exposes the same methods over `MessagingSessionDyn`.
pub struct BoxSession {
    inner: Box<dyn MessagingSessionDyn + Send + Sync>,
}

impl BoxSession {
    /// Wrap a concrete session.
    pub fn new<T: MessagingSession + 'static>(session: T) -> Self {
        Self {
            inner: Box::new(session),
        }
    }

    pub fn profile_name(&self) -> Option<String> {
        self.inner.profile_name()
    }

    pub async fn list_dialogs(&self) -> Result<Vec<DialogPeer>, TransportError> {
        self.inner.list_dialogs_boxed().await
    }

    pub async fn resolve_handle(&self, handle: &str) -> Result<Option<DialogPeer>, TransportError> {
        self.inner.resolve_handle_boxed(handle).await
    }

    pub async fn send_message(&self, peer: &DialogPeer, text: &str) -> Result<(), TransportError> {
        self.inner.send_message_boxed(peer, text).await
    }

    pub async fn disconnect(&self) {
        self.inner.disconnect_boxed().await
    }
}

impl std::fmt::Debug for BoxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSession")
            .field("profile_name", &self.inner.profile_name())
            .finish()
    }
}
