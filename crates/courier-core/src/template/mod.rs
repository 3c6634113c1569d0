//! Template store and engine.
//!
//! `placeholder` holds the pure extraction/substitution functions,
//! `repository` the persistence port, and `service` the stateful store.

pub mod placeholder;
pub mod repository;
pub mod service;

pub use service::TemplateService;
