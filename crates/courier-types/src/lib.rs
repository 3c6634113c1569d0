//! Shared domain types for Courier.
//!
//! Accounts, dialogs, templates, dispatch results, notification events, and
//! their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, secrecy, thiserror.

pub mod account;
pub mod config;
pub mod dialog;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod template;
