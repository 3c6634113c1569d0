use std::fmt;

use serde::{Deserialize, Serialize};

/// A named message template.
///
/// `placeholders` is always derived from `body` (sorted, deduplicated). It is
/// recomputed whenever a template is written or loaded and is never edited on
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub body: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placeholders: Vec<String>,
}

/// Whether an upsert created a new template or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateUpsert {
    Added,
    Updated,
}

impl fmt::Display for TemplateUpsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateUpsert::Added => write!(f, "added"),
            TemplateUpsert::Updated => write!(f, "updated"),
        }
    }
}

/// Shape of the template document found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// `name -> { body, description, placeholders }`.
    Current,
    /// Flat `name -> body`, upgraded on load.
    Legacy,
    /// No document yet.
    Missing,
}
