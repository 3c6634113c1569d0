//! Dispatcher: render a template and deliver it through an account.
//!
//! All four entry points funnel into `deliver`, which walks a list of
//! candidate accounts in order and stops at the first one that delivers.
//! There are no retries; an account that fails is recorded and skipped.

use std::collections::HashMap;
use std::sync::Arc;

use courier_types::account::Account;
use courier_types::dialog::{AccountFailure, DialogInfo, DialogPeer, normalize_handle};
use courier_types::dispatch::ScriptResult;
use courier_types::error::{AccountError, ErrorKind};
use courier_types::event::CourierEvent;

use crate::account::AccountRegistry;
use crate::event::EventBus;
use crate::template::TemplateService;
use crate::template::repository::TemplateRepository;
use crate::transport::BoxSession;

/// How a candidate account reaches the recipient.
enum Route<'a> {
    /// A peer already resolved by the owning account.
    Peer(&'a DialogPeer),
    /// A public handle each account resolves on its own.
    Handle(&'a str),
}

type Candidate = (Account, Arc<BoxSession>);

pub struct Dispatcher<R: TemplateRepository> {
    templates: Arc<TemplateService<R>>,
    registry: Arc<AccountRegistry>,
    events: EventBus,
}

impl<R: TemplateRepository> Dispatcher<R> {
    pub fn new(
        templates: Arc<TemplateService<R>>,
        registry: Arc<AccountRegistry>,
        events: EventBus,
    ) -> Self {
        Self {
            templates,
            registry,
            events,
        }
    }

    /// Send to a dialog found by the resolver, through the account that found it.
    pub async fn send_to_dialog(
        &self,
        dialog: &DialogInfo,
        template: &str,
        parameters: &HashMap<String, String>,
    ) -> ScriptResult {
        let target = format!("@{}", dialog.handle);
        let message = match self.render(&target, template, parameters).await {
            Ok(message) => message,
            Err(result) => return result,
        };

        if !dialog.found {
            return self.fail(&target, Some(message), "dialog not found", Vec::new());
        }
        let (Some(account), Some(peer)) = (dialog.account.as_deref(), dialog.peer.as_ref()) else {
            return self.fail(&target, Some(message), "dialog has no owning account", Vec::new());
        };

        match self.select(account).await {
            Ok(candidates) => {
                self.deliver(&target, message, candidates, Route::Peer(peer))
                    .await
            }
            Err(err) => self.fail(&target, Some(message), err.to_string(), Vec::new()),
        }
    }

    /// Send to a dialog's handle through a specific account.
    ///
    /// The handle is resolved again by `account`; it need not be the
    /// account that found the dialog.
    pub async fn send_to_dialog_via(
        &self,
        dialog: &DialogInfo,
        account: &str,
        template: &str,
        parameters: &HashMap<String, String>,
    ) -> ScriptResult {
        self.send_to_handle_via(&dialog.handle, account, template, parameters)
            .await
    }

    /// Send to a raw handle, trying every connected account in order.
    pub async fn send_to_handle(
        &self,
        handle: &str,
        template: &str,
        parameters: &HashMap<String, String>,
    ) -> ScriptResult {
        let handle = normalize_handle(handle);
        let target = format!("@{handle}");
        let message = match self.render(&target, template, parameters).await {
            Ok(message) => message,
            Err(result) => return result,
        };
        if handle.is_empty() {
            return self.reject(&target, message);
        }

        let candidates = self.registry.connected().await;
        self.deliver(&target, message, candidates, Route::Handle(&handle))
            .await
    }

    /// Send to a raw handle through one named account only.
    pub async fn send_to_handle_via(
        &self,
        handle: &str,
        account: &str,
        template: &str,
        parameters: &HashMap<String, String>,
    ) -> ScriptResult {
        let handle = normalize_handle(handle);
        let target = format!("@{handle}");
        let message = match self.render(&target, template, parameters).await {
            Ok(message) => message,
            Err(result) => return result,
        };
        if handle.is_empty() {
            return self.reject(&target, message);
        }

        match self.select(account).await {
            Ok(candidates) => {
                self.deliver(&target, message, candidates, Route::Handle(&handle))
                    .await
            }
            Err(err) => self.fail(&target, Some(message), err.to_string(), Vec::new()),
        }
    }

    async fn render(
        &self,
        target: &str,
        template: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<String, ScriptResult> {
        self.templates
            .render(template, parameters)
            .await
            .map_err(|err| self.fail(target, None, err.to_string(), Vec::new()))
    }

    /// The named account as a single candidate, if it is connected.
    async fn select(&self, account: &str) -> Result<Vec<Candidate>, AccountError> {
        let candidates: Vec<Candidate> = self
            .registry
            .connected()
            .await
            .into_iter()
            .filter(|(a, _)| a.name == account)
            .collect();
        if candidates.is_empty() {
            return Err(AccountError::NotFound(account.to_string()));
        }
        Ok(candidates)
    }

    async fn deliver(
        &self,
        target: &str,
        message: String,
        candidates: Vec<Candidate>,
        route: Route<'_>,
    ) -> ScriptResult {
        if candidates.is_empty() {
            return self.fail(target, Some(message), "no connected accounts", Vec::new());
        }

        let mut failures = Vec::new();
        for (account, session) in candidates {
            match attempt(&session, &route, &message).await {
                Ok(()) => {
                    tracing::info!(account = %account.name, target = %target, "message dispatched");
                    self.events.publish(CourierEvent::MessageDispatched {
                        target: target.to_string(),
                        account: account.name.clone(),
                    });
                    return ScriptResult::delivered(message, &account.name, failures);
                }
                Err((kind, error)) => {
                    tracing::warn!(
                        account = %account.name,
                        target = %target,
                        error = %error,
                        "delivery failed, trying next account"
                    );
                    failures.push(AccountFailure {
                        account: account.name,
                        kind,
                        error,
                    });
                }
            }
        }

        let error = match failures.as_slice() {
            [only] => only.to_string(),
            all => format!(
                "all {} accounts failed: {}",
                all.len(),
                all.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        };
        self.fail(target, Some(message), error, failures)
    }

    fn reject(&self, target: &str, message: String) -> ScriptResult {
        let reason = "handle cannot be empty";
        self.events.publish(CourierEvent::ValidationRejected {
            operation: "dispatch".to_string(),
            reason: reason.to_string(),
        });
        self.fail(target, Some(message), reason, Vec::new())
    }

    fn fail(
        &self,
        target: &str,
        message: Option<String>,
        error: impl Into<String>,
        failures: Vec<AccountFailure>,
    ) -> ScriptResult {
        let result = ScriptResult::failed(message, error).with_failures(failures);
        self.events.publish(CourierEvent::DispatchFailed {
            target: target.to_string(),
            error: result.error.clone().unwrap_or_default(),
        });
        result
    }
}

/// One delivery attempt through one session.
async fn attempt(
    session: &BoxSession,
    route: &Route<'_>,
    message: &str,
) -> Result<(), (ErrorKind, String)> {
    let resolved;
    let peer = match route {
        Route::Peer(peer) => *peer,
        Route::Handle(handle) => {
            resolved = session
                .resolve_handle(handle)
                .await
                .map_err(|e| (e.kind(), e.to_string()))?
                .ok_or_else(|| (ErrorKind::NotFound, format!("handle @{handle} not found")))?;
            &resolved
        }
    };
    session
        .send_message(peer, message)
        .await
        .map_err(|e| (e.kind(), e.to_string()))
}
