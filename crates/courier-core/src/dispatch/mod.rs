//! Message dispatch with per-account fallback.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
