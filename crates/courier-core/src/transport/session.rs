//! MessagingSession trait definition.
//!
//! A session is the opaque capability an authenticated account exposes:
//! list its dialogs, resolve a public handle, send text, and sign out.
//! Uses RPITIT for every network-bound method; `BoxSession` provides the
//! object-safe wrapper the registry stores.

use std::future::Future;

use courier_types::dialog::DialogPeer;
use courier_types::error::TransportError;

/// An authenticated session with the messaging network.
///
/// Every async method is a suspension point that may block on a network
/// round trip. Sessions impose no timeout of their own beyond whatever the
/// transport implements; callers wrap calls in `tokio::time::timeout`.
pub trait MessagingSession: Send + Sync {
    /// Profile name of the signed-in user, if known.
    fn profile_name(&self) -> Option<String>;

    /// Fetch every dialog (users, groups, channels) visible to this account.
    fn list_dialogs(&self) -> impl Future<Output = Result<Vec<DialogPeer>, TransportError>> + Send;

    /// Resolve a public handle (no leading `@`). `Ok(None)` when nobody owns it.
    fn resolve_handle(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Option<DialogPeer>, TransportError>> + Send;

    /// Send a plain-text message to a peer.
    fn send_message(
        &self,
        peer: &DialogPeer,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Release the session. Further calls may fail with `SessionClosed`.
    fn disconnect(&self) -> impl Future<Output = ()> + Send;
}
