//! Infrastructure layer for Courier.
//!
//! Contains implementations of the ports defined in `courier-core`: the JSON
//! template document, the offline fixture transport, and the configuration
//! and data-directory helpers the binary starts from.

pub mod config;
pub mod filesystem;
pub mod template;
pub mod transport;
