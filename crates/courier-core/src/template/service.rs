//! Template store and rendering service.
//!
//! Owns the name -> template map, persists every mutation through a
//! `TemplateRepository`, and renders templates against parameter maps.
//! Mutations hold the write lock across clone, persist, and swap, so a failed
//! save never leaves a partial update visible and a reload cannot interleave
//! with an add.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use courier_types::error::TemplateError;
use courier_types::event::CourierEvent;
use courier_types::template::{DocumentFormat, Template, TemplateUpsert};

use super::placeholder::{extract_placeholders, render_body};
use super::repository::{StoredTemplate, TemplateRepository};
use crate::event::EventBus;

/// Build a template from its stored form, deriving placeholders from the body.
pub fn build_template(name: &str, stored: StoredTemplate) -> Template {
    let placeholders = extract_placeholders(&stored.body);
    Template {
        name: name.to_string(),
        body: stored.body,
        description: stored.description,
        placeholders,
    }
}

/// Service managing named message templates.
///
/// Generic over the repository trait so courier-core never depends on
/// courier-infra.
pub struct TemplateService<R: TemplateRepository> {
    repo: R,
    templates: RwLock<BTreeMap<String, Template>>,
    events: EventBus,
}

impl<R: TemplateRepository> TemplateService<R> {
    /// Create an empty service. Call [`load`](Self::load) to read the store.
    pub fn new(repo: R, events: EventBus) -> Self {
        Self {
            repo,
            templates: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    /// Load the backing document, replacing in-memory state.
    ///
    /// Never fails: a missing document yields an empty set, and an unreadable
    /// one yields an empty set plus a `StoreDegraded` event. A legacy document
    /// is upgraded and written back in the current shape. Returns the number of
    /// templates loaded.
    pub async fn load(&self) -> usize {
        let mut guard = self.templates.write().await;

        let loaded = match self.repo.load().await {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(error = %err, "Template store unreadable, starting empty");
                guard.clear();
                self.events.publish(CourierEvent::StoreDegraded {
                    reason: err.to_string(),
                });
                return 0;
            }
        };

        let mut next = BTreeMap::new();
        for (name, stored) in loaded.templates {
            if name.trim().is_empty() {
                tracing::warn!("Skipping stored template with an empty name");
                continue;
            }
            next.insert(name.clone(), build_template(&name, stored));
        }

        let mut migrated = false;
        if loaded.format == DocumentFormat::Legacy {
            match self.repo.save(&next).await {
                Ok(()) => {
                    tracing::info!(count = next.len(), "Upgraded legacy template document");
                    migrated = true;
                }
                Err(err) => {
                    // Templates stay usable in memory; the next mutation retries the write.
                    tracing::warn!(error = %err, "Failed to rewrite legacy template document");
                    self.events.publish(CourierEvent::StoreDegraded {
                        reason: format!("legacy document not upgraded: {err}"),
                    });
                }
            }
        }

        let count = next.len();
        *guard = next;
        drop(guard);

        self.events
            .publish(CourierEvent::TemplatesReloaded { count, migrated });
        count
    }

    /// Discard in-memory state and re-read the store.
    pub async fn reload(&self) -> usize {
        self.load().await
    }

    /// Add a new template or replace an existing one, then persist.
    ///
    /// Returns whether the template was added or updated. On persistence
    /// failure the in-memory state is unchanged.
    pub async fn add_or_update(
        &self,
        name: &str,
        body: &str,
        description: &str,
    ) -> Result<TemplateUpsert, TemplateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject("add template", "template name cannot be empty"));
        }
        if body.trim().is_empty() {
            return Err(self.reject("add template", "template body cannot be empty"));
        }

        let template = build_template(
            name,
            StoredTemplate {
                body: body.to_string(),
                description: description.to_string(),
            },
        );

        let mut guard = self.templates.write().await;
        let mut next = guard.clone();
        let outcome = match next.insert(name.to_string(), template) {
            Some(_) => TemplateUpsert::Updated,
            None => TemplateUpsert::Added,
        };

        if let Err(err) = self.repo.save(&next).await {
            tracing::error!(template = %name, error = %err, "Failed to persist template");
            return Err(err);
        }
        *guard = next;
        drop(guard);

        tracing::info!(template = %name, %outcome, "Template saved");
        self.events.publish(CourierEvent::TemplateSaved {
            name: name.to_string(),
            created: outcome == TemplateUpsert::Added,
        });
        Ok(outcome)
    }

    /// Delete a template by name, then persist.
    ///
    /// Names are trimmed, as in [`Self::add_or_update`].
    pub async fn delete(&self, name: &str) -> Result<(), TemplateError> {
        let name = name.trim();
        let mut guard = self.templates.write().await;
        if !guard.contains_key(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        let mut next = guard.clone();
        next.remove(name);

        if let Err(err) = self.repo.save(&next).await {
            tracing::error!(template = %name, error = %err, "Failed to persist template deletion");
            return Err(err);
        }
        *guard = next;
        drop(guard);

        self.events.publish(CourierEvent::TemplateDeleted {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Get a copy of a template by name.
    pub async fn get(&self, name: &str) -> Option<Template> {
        self.templates.read().await.get(name.trim()).cloned()
    }

    /// Copies of all templates, ordered by name.
    pub async fn list(&self) -> Vec<Template> {
        self.templates.read().await.values().cloned().collect()
    }

    /// All template names, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.templates.read().await.keys().cloned().collect()
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.templates.read().await.contains_key(name.trim())
    }

    /// Render a named template against `parameters`.
    ///
    /// Missing parameters render as `[Name]`; they are not an error.
    pub async fn render(
        &self,
        name: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<String, TemplateError> {
        let name = name.trim();
        let guard = self.templates.read().await;
        let template = guard
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        if template.body.trim().is_empty() {
            return Err(TemplateError::Validation(format!(
                "template '{name}' has an empty body"
            )));
        }

        Ok(render_body(&template.body, parameters))
    }

    fn reject(&self, operation: &str, reason: &str) -> TemplateError {
        self.events.publish(CourierEvent::ValidationRejected {
            operation: operation.to_string(),
            reason: reason.to_string(),
        });
        TemplateError::Validation(reason.to_string())
    }
}
