//! Terminal challenge handler for account sign-in.
//!
//! Answers given on the command line are used first; anything missing is
//! prompted for with dialoguer when a terminal is attached. Without a
//! terminal a missing answer aborts the sign-in.

use console::style;
use dialoguer::{Input, Password};

use courier_core::account::{ChallengeHandler, PresetChallenge};

pub struct TerminalChallenge {
    preset: PresetChallenge,
    interactive: bool,
}

impl TerminalChallenge {
    pub fn new(preset: PresetChallenge) -> Self {
        Self {
            preset,
            interactive: console::Term::stderr().is_term(),
        }
    }
}

async fn prompt(label: String, hidden: bool) -> Option<String> {
    let answer = tokio::task::spawn_blocking(move || {
        if hidden {
            Password::new().with_prompt(label).interact()
        } else {
            Input::<String>::new().with_prompt(label).interact_text()
        }
    })
    .await;

    match answer {
        Ok(Ok(value)) if !value.trim().is_empty() => Some(value),
        Ok(Ok(_)) => None,
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "prompt aborted");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "prompt task failed");
            None
        }
    }
}

impl ChallengeHandler for TerminalChallenge {
    async fn request_code(&self, phone: &str) -> Option<String> {
        if let Some(code) = self.preset.request_code(phone).await {
            return Some(code);
        }
        if !self.interactive {
            return None;
        }
        prompt(
            format!("Verification code sent to {}", style(phone).bold()),
            false,
        )
        .await
    }

    async fn request_password(&self, phone: &str, hint: Option<&str>) -> Option<String> {
        if let Some(password) = self.preset.request_password(phone, hint).await {
            return Some(password);
        }
        if !self.interactive {
            return None;
        }
        let label = match hint {
            Some(hint) => format!(
                "Two-factor password for {} (hint: {})",
                style(phone).bold(),
                style(hint).dim()
            ),
            None => format!("Two-factor password for {}", style(phone).bold()),
        };
        prompt(label, true).await
    }

    async fn request_profile_name(&self, phone: &str) -> Option<String> {
        if let Some(name) = self.preset.request_profile_name(phone).await {
            return Some(name);
        }
        if !self.interactive {
            return None;
        }
        prompt(
            format!("{} is new here. Profile name", style(phone).bold()),
            false,
        )
        .await
    }
}
