//! File-backed template store.

pub mod json_store;

pub use json_store::JsonTemplateRepository;
