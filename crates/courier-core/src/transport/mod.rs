//! Messaging transport port.
//!
//! `MessagingTransport` drives sign-in, `MessagingSession` is what an
//! authenticated account can do. Both use RPITIT; `BoxTransport` and
//! `BoxSession` are the type-erased forms the services hold.

pub mod box_session;
pub mod box_transport;
pub mod login;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use box_session::BoxSession;
pub use box_transport::BoxTransport;
pub use login::{LoginStep, MessagingTransport, PendingLogin};
pub use session::MessagingSession;
