//! Template repository trait definition (port).
//!
//! The infrastructure layer implements this against a durable document
//! (`JsonTemplateRepository` in courier-infra). The service never touches the
//! filesystem directly.

use std::collections::BTreeMap;

use courier_types::error::TemplateError;
use courier_types::template::{DocumentFormat, Template};

/// A template as read from the backing document.
///
/// Placeholders are deliberately absent: they are derived data and are
/// recomputed by the service on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTemplate {
    pub body: String,
    pub description: String,
}

/// Result of reading the backing document.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub templates: BTreeMap<String, StoredTemplate>,
    pub format: DocumentFormat,
}

impl LoadedDocument {
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
            format: DocumentFormat::Missing,
        }
    }
}

/// Repository trait for template persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait TemplateRepository: Send + Sync {
    /// Read the whole document.
    ///
    /// A missing document is `Ok` with `DocumentFormat::Missing`. A document
    /// that matches neither the current nor the legacy shape is
    /// `Err(TemplateError::Persistence)`.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<LoadedDocument, TemplateError>> + Send;

    /// Replace the whole document with `templates`, in the current shape.
    ///
    /// Placeholder lists are written for readers of the file only; `load`
    /// ignores them.
    fn save(
        &self,
        templates: &BTreeMap<String, Template>,
    ) -> impl std::future::Future<Output = Result<(), TemplateError>> + Send;
}
