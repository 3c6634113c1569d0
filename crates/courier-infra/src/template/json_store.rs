//! JSON file implementation of `TemplateRepository`.
//!
//! Current shape:
//!
//! ```json
//! {"greet": {"body": "Hello, {Name}!", "description": "", "placeholders": ["Name"]}}
//! ```
//!
//! The older flat shape (`{"greet": "Hello, {Name}!"}`) is still read and is
//! reported as `DocumentFormat::Legacy` so the service can rewrite it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use courier_core::template::repository::{LoadedDocument, StoredTemplate, TemplateRepository};
use courier_types::error::TemplateError;
use courier_types::template::{DocumentFormat, Template};

use crate::filesystem::write_atomic;

#[derive(Deserialize)]
struct EntryIn {
    body: String,
    #[serde(default)]
    description: String,
}

/// The two document shapes, tried in declaration order.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentIn {
    Current(BTreeMap<String, EntryIn>),
    Legacy(BTreeMap<String, String>),
}

#[derive(Serialize)]
struct EntryOut<'a> {
    body: &'a str,
    description: &'a str,
    placeholders: &'a [String],
}

/// Template document stored as a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonTemplateRepository {
    path: PathBuf,
}

impl JsonTemplateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a template document, detecting which shape it uses.
pub fn parse_document(content: &str) -> Result<LoadedDocument, TemplateError> {
    if content.trim().is_empty() {
        return Ok(LoadedDocument::empty());
    }

    let doc: DocumentIn = serde_json::from_str(content).map_err(|e| {
        TemplateError::Persistence(format!("template document is not in a known shape: {e}"))
    })?;

    Ok(match doc {
        DocumentIn::Current(entries) => LoadedDocument {
            templates: entries
                .into_iter()
                .map(|(name, e)| {
                    (
                        name,
                        StoredTemplate {
                            body: e.body,
                            description: e.description,
                        },
                    )
                })
                .collect(),
            format: DocumentFormat::Current,
        },
        DocumentIn::Legacy(entries) => LoadedDocument {
            templates: entries
                .into_iter()
                .map(|(name, body)| {
                    (
                        name,
                        StoredTemplate {
                            body,
                            description: String::new(),
                        },
                    )
                })
                .collect(),
            format: DocumentFormat::Legacy,
        },
    })
}

/// Serialize templates in the current shape, keys in sorted order.
pub fn render_document(templates: &BTreeMap<String, Template>) -> Result<String, TemplateError> {
    let out: BTreeMap<&str, EntryOut<'_>> = templates
        .iter()
        .map(|(name, t)| {
            (
                name.as_str(),
                EntryOut {
                    body: &t.body,
                    description: &t.description,
                    placeholders: &t.placeholders,
                },
            )
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&out)
        .map_err(|e| TemplateError::Persistence(format!("failed to serialize templates: {e}")))?;
    json.push('\n');
    Ok(json)
}

impl TemplateRepository for JsonTemplateRepository {
    async fn load(&self) -> Result<LoadedDocument, TemplateError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No template document, starting empty");
                return Ok(LoadedDocument::empty());
            }
            Err(err) => {
                return Err(TemplateError::Persistence(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        parse_document(&content)
    }

    async fn save(&self, templates: &BTreeMap<String, Template>) -> Result<(), TemplateError> {
        let json = render_document(templates)?;
        write_atomic(&self.path, json.as_bytes()).await.map_err(|e| {
            TemplateError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), count = templates.len(), "Template document saved");
        Ok(())
    }
}
