//! Business logic and port definitions for Courier.
//!
//! This crate defines the "ports" (transport, challenge and template
//! repository traits) that the infrastructure layer implements, and the
//! services built on them. It depends only on `courier-types` -- never on
//! `courier-infra` or any IO crate.

pub mod account;
pub mod dialog;
pub mod dispatch;
pub mod event;
pub mod template;
pub mod transport;
